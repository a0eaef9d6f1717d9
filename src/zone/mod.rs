pub mod compiler;
pub mod defaults;
pub mod parser;
pub mod record;

pub use compiler::ZoneCompiler;
pub use defaults::DefaultPolicy;
pub use parser::{ParsedZone, ZoneFileParser, domain_from_path};
pub use record::{RRset, Record, RecordType};

/// Zone constants
pub mod constants {
    /// Default TTL for records before any explicit TTL is seen (4 hours)
    pub const DEFAULT_TTL: u32 = 14400;

    /// TTL of the synthesized apex NS RRset
    pub const DEFAULT_NS_TTL: u32 = 3600;

    /// Zone files are named `<domain>.db`
    pub const ZONE_FILE_SUFFIX: &str = ".db";

    /// Maximum zone file size (10MB)
    pub const MAX_ZONE_FILE_SIZE: usize = 10 * 1024 * 1024;
}

/// `example.com` -> `example.com.`
pub fn zone_fqdn(domain: &str) -> String {
    format!("{}.", domain.trim_end_matches('.'))
}
