pub mod article;
pub mod flag;
pub mod profile;
pub mod snapshot;
pub mod view;

pub use article::{format_published, parse_published, Article, RawItem};
pub use flag::{ArticleFilter, Flag, FlagUpdate};
pub use profile::{Profile, ReadingStats};
pub use snapshot::SnapshotRecord;
pub use view::ArticleView;
