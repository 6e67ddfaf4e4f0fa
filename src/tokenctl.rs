use clap::Parser;
use navlink::token::{fetch_token, TokenConfig};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Participant name to request a token for
    #[arg()]
    participant: String,

    /// Token endpoint URL
    #[arg(
        long,
        env,
        default_value = "https://controller.satinavrobotics.com/api/createToken"
    )]
    token_url: String,

    /// Room name requested from the endpoint
    #[arg(long, env = "RELAY_ROOM", default_value = "admin@satinavrobotics.com")]
    room: String,

    /// Token endpoint basic-auth user
    #[arg(long, env = "TOKEN_USER")]
    user: String,

    /// Token endpoint basic-auth password
    #[arg(long, env = "TOKEN_PASS")]
    pass: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = TokenConfig {
        url: args.token_url,
        room: args.room,
        user: args.user,
        pass: args.pass,
    };

    match fetch_token(&config, &args.participant).await {
        Ok(token) => println!("{}", token),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
