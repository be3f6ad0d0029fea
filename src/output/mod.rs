// Output module - Report formatting (JSON, Terminal)

pub mod json;
pub mod terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    JSON,
    JSONPretty,
}

impl OutputFormat {
    pub fn json(pretty: bool) -> Self {
        if pretty {
            OutputFormat::JSONPretty
        } else {
            OutputFormat::JSON
        }
    }

    pub fn is_pretty(&self) -> bool {
        matches!(self, OutputFormat::JSONPretty)
    }
}
