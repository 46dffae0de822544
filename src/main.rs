#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    rpm_generator::run().await
}
