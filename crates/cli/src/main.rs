use anyhow::Result;
use clap::Parser;
use qikspare_cli::{App, Cli};
use qikspare_client::HttpInvoiceGateway;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    qikspare_observability::init(cli.config.log_format);

    tracing::debug!(api_url = %cli.config.api_url, "starting");

    let gateway = HttpInvoiceGateway::new(cli.config.client());
    let app = App::new(gateway, cli.config.export_options(), cli.config.output_dir.clone())?;

    let mut stdout = std::io::stdout().lock();
    app.run(cli.command, &mut stdout).await
}
