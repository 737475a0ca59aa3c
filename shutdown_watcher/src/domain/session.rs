// Session handed over by the lab server through the marker file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub session_id: String,
    pub register_no: Option<String>,
    pub name: Option<String>,
}

impl ActiveSession {
    /// Reads marker content written by the server.
    ///
    /// Two shapes are accepted: `id|register_no|name` (the name keeps any
    /// further `|`) and a bare session id. Blank or otherwise malformed
    /// content yields `None`.
    pub fn from_marker(content: &str) -> Option<Self> {
        let content = content.trim();
        match content.split_once('|') {
            Some((session_id, rest)) => {
                let (register_no, name) = rest.split_once('|')?;
                let session_id = session_id.trim();
                if session_id.is_empty() {
                    return None;
                }
                Some(Self {
                    session_id: session_id.to_string(),
                    register_no: Some(register_no.trim().to_string()),
                    name: Some(name.trim().to_string()),
                })
            }
            None if content.is_empty() || content.contains(char::is_whitespace) => None,
            None => Some(Self {
                session_id: content.to_string(),
                register_no: None,
                name: None,
            }),
        }
    }

    // "Name (REGNO)" when the marker carried identity details.
    pub fn describe(&self) -> String {
        match (&self.name, &self.register_no) {
            (Some(name), Some(register_no)) => format!("{name} ({register_no})"),
            _ => format!("session {}", self.session_id),
        }
    }
}
