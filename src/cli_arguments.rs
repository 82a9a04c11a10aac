use clap::{Parser, ValueEnum, command};

use butter::{DateDecodingStrategy, RequestMethod};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateStrategy {
    Deferred,
    Seconds,
    Milliseconds,
    Iso8601,
}

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub(crate) struct CliArguments {
    #[arg(short = 'H', long)]
    pub host: String,

    #[arg(short, long, default_value = "/")]
    pub path: String,

    #[arg(short, long, default_value = "GET")]
    pub method: RequestMethod,

    #[arg(short, long, default_value = "https")]
    pub scheme: String,

    /// Query item as `name=value`, repeatable.
    #[arg(short, long = "query", value_parser = parse_query_item)]
    pub query: Vec<(String, String)>,

    /// Header as `name:value`, repeatable.
    #[arg(short = 'e', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body; sent as JSON when it parses as JSON.
    #[arg(short, long)]
    pub body: Option<String>,

    #[arg(short, long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long, value_enum, conflicts_with = "date_format")]
    pub date_strategy: Option<DateStrategy>,

    /// chrono format string for date fields.
    #[arg(long)]
    pub date_format: Option<String>,
}

impl CliArguments {
    pub(crate) fn decoding_strategy(&self) -> Option<DateDecodingStrategy> {
        if let Some(format) = &self.date_format {
            return Some(DateDecodingStrategy::Formatted(format.clone()));
        }

        self.date_strategy.map(|strategy| match strategy {
            DateStrategy::Deferred => DateDecodingStrategy::DeferredToDate,
            DateStrategy::Seconds => DateDecodingStrategy::SecondsSince1970,
            DateStrategy::Milliseconds => DateDecodingStrategy::MillisecondsSince1970,
            DateStrategy::Iso8601 => DateDecodingStrategy::Iso8601,
        })
    }
}

fn split_pair(value: &str, separator: char) -> Result<(String, String), String> {
    value
        .split_once(separator)
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected `name{separator}value`, got `{value}`"))
}

fn parse_query_item(value: &str) -> Result<(String, String), String> {
    split_pair(value, '=')
}

fn parse_header(value: &str) -> Result<(String, String), String> {
    split_pair(value, ':')
}
