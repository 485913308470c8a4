use super::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "bazaar credential and session service")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
}
