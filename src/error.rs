#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("cannot open automaton {path}: {source}")]
    Automaton {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("automaton {path}, line {line}: {detail}")]
    Vtf {
        path: String,
        line: usize,
        detail: String,
    },
    #[error("capture {path}: {detail}")]
    Capture { path: String, detail: String },
    #[error("report output error: {0}")]
    Report(#[source] std::io::Error),
}
