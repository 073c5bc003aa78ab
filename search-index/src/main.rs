use dotenv::dotenv;
use tracing::{error, info};

use search_index::{logging, Dependencies, IndexingError, Settings};

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    dotenv().ok();
    logging::init();

    let settings = Settings::from_env()?;
    let dependencies = Dependencies::new(&settings)?;

    match dependencies.run().await {
        Ok(()) => {
            info!("Search index provisioning complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Search index provisioning failed");
            Err(e)
        }
    }
}
