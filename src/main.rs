use filehound::app::startup::startup;

#[tokio::main]
async fn main() {
    std::process::exit(startup().await);
}
