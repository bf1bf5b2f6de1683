use cling::prelude::*;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ClingFinished<quexcli::App> {
    Cling::parse_and_run().await
}
