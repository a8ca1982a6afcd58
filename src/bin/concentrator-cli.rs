use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[derive(Parser)]
#[command(name = "concentrator-cli")]
#[command(about = "Management CLI for concentrator-core", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:2001")]
    address: String,

    /// Command to run, e.g. `connlimit show` or `connlimit flush ip 10.0.0.1`
    #[arg(trailing_var_arg = true, default_value = "help")]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let stream = TcpStream::connect(&cli.address).await?;
    let (reader, mut writer) = stream.into_split();

    let line = format!("{}\n", cli.command.join(" "));
    writer.write_all(line.as_bytes()).await?;

    let mut lines = BufReader::new(reader).lines();
    while let Some(reply) = lines.next_line().await? {
        // The reply ends at the first empty line.
        if reply.trim_end_matches('\r').is_empty() {
            break;
        }
        println!("{}", reply.trim_end_matches('\r'));
    }

    writer.write_all(b"exit\n").await?;
    Ok(())
}
