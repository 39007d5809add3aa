//! Default rejection body.

use axum::body::Bytes;

use crate::gate::GateError;

const TEMPLATE_HEAD: &str = "<!DOCTYPE html>\n\
<html>\n\
<head><title>426 Upgrade Required</title></head>\n\
<body>\n\
<center><h1>426 Upgrade Required</h1></center>\n\
<hr>\n\
<center>This server requires HTTP/2.0 or HTTP/1.1</center>\n\
<center>Your client used: ";

const TEMPLATE_TAIL: &str = "</center>\n</body>\n</html>\n";

/// Render the built-in template with `version` in its single slot.
pub fn render_default(version: &str) -> Result<Bytes, GateError> {
    let len = TEMPLATE_HEAD.len() + version.len() + TEMPLATE_TAIL.len();
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| GateError::BodyAllocation { len })?;

    buf.extend_from_slice(TEMPLATE_HEAD.as_bytes());
    buf.extend_from_slice(version.as_bytes());
    buf.extend_from_slice(TEMPLATE_TAIL.as_bytes());
    Ok(Bytes::from(buf))
}
