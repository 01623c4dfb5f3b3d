//! Request head and query argument parsing.

use tracing::debug;

use gantry_core::error::{GatewayError, Result};
use gantry_core::names::{is_valid_channel_name, is_valid_topic_name};

/// Transport-level facts about one request, known before the body is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHead {
    /// Raw query string, without the leading `?`
    pub query: String,
    /// Whether the connection is TLS-protected
    pub secure: bool,
    /// Declared body length, if the client sent one
    pub content_length: Option<u64>,
    /// Peer address, used to attribute forwarded writes in logs
    pub remote_addr: Option<String>,
}

impl RequestHead {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Peer address for log lines, `-` when unknown.
    pub fn origin(&self) -> &str {
        self.remote_addr.as_deref().unwrap_or("-")
    }

    /// Parse the query string.
    pub fn params(&self) -> Result<QueryParams> {
        QueryParams::parse(&self.query)
    }
}

/// Decoded `application/x-www-form-urlencoded` query arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

/// Validated topic arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicArgs {
    pub topic: String,
    /// `None` lets the engine pick its local partition
    pub partition: Option<u32>,
}

impl QueryParams {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        serde_urlencoded::from_str::<Vec<(String, String)>>(raw)
            .map(|pairs| Self { pairs })
            .map_err(|e| {
                debug!("[GATEWAY] Failed to parse request params: {}", e);
                GatewayError::InvalidRequest
            })
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` appears at all, with or without a value.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn topic_arg(&self) -> Result<&str> {
        let topic = self
            .get("topic")
            .filter(|t| !t.is_empty())
            .ok_or(GatewayError::MissingArgTopic)?;
        if !is_valid_topic_name(topic) {
            return Err(GatewayError::InvalidTopic);
        }
        Ok(topic)
    }

    pub fn partition_arg(&self) -> Result<Option<u32>> {
        match self.get("partition").filter(|p| !p.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| GatewayError::InvalidPartition),
        }
    }

    pub fn channel_arg(&self) -> Result<&str> {
        let channel = self
            .get("channel")
            .filter(|c| !c.is_empty())
            .ok_or(GatewayError::MissingArgChannel)?;
        if !is_valid_channel_name(channel) {
            return Err(GatewayError::InvalidChannel);
        }
        Ok(channel)
    }

    pub fn topic_args(&self) -> Result<TopicArgs> {
        Ok(TopicArgs {
            topic: self.topic_arg()?.to_string(),
            partition: self.partition_arg()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_and_partition() {
        let params = QueryParams::parse("topic=orders&partition=2").unwrap();
        assert_eq!(
            params.topic_args().unwrap(),
            TopicArgs {
                topic: "orders".to_string(),
                partition: Some(2),
            }
        );
    }

    #[test]
    fn test_missing_and_invalid_topic() {
        let params = QueryParams::parse("channel=c").unwrap();
        assert!(matches!(params.topic_arg(), Err(GatewayError::MissingArgTopic)));

        let params = QueryParams::parse("topic=").unwrap();
        assert!(matches!(params.topic_arg(), Err(GatewayError::MissingArgTopic)));

        let params = QueryParams::parse("topic=bad%20name").unwrap();
        assert!(matches!(params.topic_arg(), Err(GatewayError::InvalidTopic)));
    }

    #[test]
    fn test_bad_partition() {
        let params = QueryParams::parse("topic=t&partition=-1").unwrap();
        assert!(matches!(
            params.partition_arg(),
            Err(GatewayError::InvalidPartition)
        ));
        let params = QueryParams::parse("topic=t&partition=").unwrap();
        assert_eq!(params.partition_arg().unwrap(), None);
    }

    #[test]
    fn test_channel() {
        let params = QueryParams::parse("topic=t&channel=c%23ephemeral").unwrap();
        assert_eq!(params.channel_arg().unwrap(), "c#ephemeral");

        let params = QueryParams::parse("topic=t").unwrap();
        assert!(matches!(
            params.channel_arg(),
            Err(GatewayError::MissingArgChannel)
        ));

        let params = QueryParams::parse("topic=t&channel=a/b").unwrap();
        assert!(matches!(params.channel_arg(), Err(GatewayError::InvalidChannel)));
    }

    #[test]
    fn test_flag_without_value() {
        let params = QueryParams::parse("?topic=t&binary").unwrap();
        assert!(params.contains("binary"));
        assert_eq!(params.get("binary"), Some(""));
        assert!(!params.contains("format"));
    }

    #[test]
    fn test_origin() {
        assert_eq!(RequestHead::new("").origin(), "-");
        let head = RequestHead::new("").with_remote_addr("10.1.2.3:51000");
        assert_eq!(head.origin(), "10.1.2.3:51000");
    }
}
