use protocol::Channel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The platform socket refused to open, send or close.
    Transport(String),
    /// A frame or config blob was not the JSON we expected.
    Decode(String),
    /// The platform has no geolocation API.
    GeolocationUnavailable,
    /// No live socket on this channel.
    NotConnected(Channel),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "{msg}"),
            ClientError::Decode(msg) => write!(f, "malformed payload: {msg}"),
            ClientError::GeolocationUnavailable => write!(f, "geolocation unavailable"),
            ClientError::NotConnected(channel) => {
                write!(f, "{} socket is not connected", channel.as_str())
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
