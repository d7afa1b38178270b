use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(amora_social_migration::Migrator).await;
}
