// Media provider backends

pub mod ytdlp;

pub use ytdlp::YtDlpResolver;
