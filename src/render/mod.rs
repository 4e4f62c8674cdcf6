//! Result rendering: URL assembly, protocol policy, plain and metalink output.

mod metalink;
mod response;
mod urls;

pub use metalink::{metalink_document, metalink_failure_doc, metalink_file_not_found, xml_escape};
pub use response::{MirrorListResponse, ResponseResults, ResultType};
pub use urls::{
    append_path, scheme_of, trim_to_preferred_protocols, trim_to_protocols, HostUrls,
};
