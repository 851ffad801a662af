use clap::Parser;
use dataway_client::{ClientConfig, FieldValue};
use secrecy::{ExposeSecret, Secret};
use std::convert::Infallible;
use std::str::FromStr;

/// Connection settings shared by every command talking to a dataway.
#[derive(Debug, Parser)]
pub(crate) struct DatawayConfig {
    /// Address of the dataway, as `protocol://server:port`
    #[clap(short = 'H', long = "host", env = "DATAWAY_HOST")]
    pub(crate) host: String,

    /// Key the request signature is computed with
    #[clap(long = "access-key", env = "DATAWAY_ACCESS_KEY")]
    pub(crate) access_key: Option<Secret<String>>,

    /// Key sent along with the request signature
    #[clap(long = "secret-key", env = "DATAWAY_SECRET_KEY")]
    pub(crate) secret_key: Option<Secret<String>>,

    /// Value of the `X-Trace-Id` header
    #[clap(long = "trace-id", env = "DATAWAY_TRACE_ID", default_value = "")]
    pub(crate) trace_id: String,

    /// Value of the `X-Datakit-UUID` header
    #[clap(long = "uuid", env = "DATAWAY_UUID", default_value = "")]
    pub(crate) client_uuid: String,

    /// Value of the `X-Version` header
    #[clap(long = "sdk-version", env = "DATAWAY_VERSION", default_value = "")]
    pub(crate) sdk_version: String,

    /// Value of the `User-Agent` header
    #[clap(long = "user-agent", env = "DATAWAY_USER_AGENT", default_value = "")]
    pub(crate) user_agent: String,

    /// Send the body uncompressed
    #[clap(long = "disable-compression", env = "DATAWAY_DISABLE_COMPRESSION")]
    pub(crate) disable_compression: bool,
}

impl From<DatawayConfig> for ClientConfig {
    fn from(config: DatawayConfig) -> Self {
        let DatawayConfig {
            host,
            access_key,
            secret_key,
            trace_id,
            client_uuid,
            sdk_version,
            user_agent,
            disable_compression,
        } = config;

        let expose = |key: &Option<Secret<String>>| {
            key.as_ref()
                .map(|k| k.expose_secret().clone())
                .unwrap_or_default()
        };

        Self::new(host)
            .with_credentials(expose(&access_key), expose(&secret_key))
            .with_trace_id(trace_id)
            .with_client_uuid(client_uuid)
            .with_version(sdk_version)
            .with_user_agent(user_agent)
            .with_compression_disabled(disable_compression)
    }
}

// A clap argument provided as a key/value pair separated by `SEPARATOR`, which by default is a '='
//
// Only the first separator splits, so values may contain it.
#[derive(Debug, Clone)]
pub(crate) struct SeparatedKeyValue<K, V, const SEPARATOR: char = '='>(pub(crate) (K, V));

impl<K, V, const SEPARATOR: char> FromStr for SeparatedKeyValue<K, V, SEPARATOR>
where
    K: FromStr<Err: Into<anyhow::Error>>,
    V: FromStr<Err: Into<anyhow::Error>>,
{
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| anyhow::anyhow!("missing value"))?;
        if key.is_empty() {
            anyhow::bail!("missing key");
        }

        Ok(Self((
            key.parse().map_err(Into::into)?,
            value.parse().map_err(Into::into)?,
        )))
    }
}

/// A field value typed from its text: an integer if it parses as `i64`,
/// otherwise a float if it parses as a finite `f64`, otherwise a string.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldArg(pub(crate) FieldValue);

impl FromStr for FieldArg {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Self(FieldValue::Integer(i)));
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Self(FieldValue::Float(f))),
            _ => Ok(Self(FieldValue::String(s.to_owned()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type KeyValue = SeparatedKeyValue<String, String>;

    fn field(s: &str) -> FieldValue {
        s.parse::<FieldArg>().unwrap().0
    }

    #[test]
    fn field_values_are_typed() {
        assert_eq!(field("42"), FieldValue::Integer(42));
        assert_eq!(field("-7"), FieldValue::Integer(-7));
        assert_eq!(field("0.5"), FieldValue::Float(0.5));
        assert_eq!(field("1e3"), FieldValue::Float(1000.0));
        assert_eq!(field("hello"), FieldValue::String("hello".to_owned()));
        assert_eq!(field(""), FieldValue::String(String::new()));
    }

    #[test]
    fn non_finite_floats_stay_strings() {
        assert_eq!(field("inf"), FieldValue::String("inf".to_owned()));
        assert_eq!(field("NaN"), FieldValue::String("NaN".to_owned()));
    }

    #[test]
    fn integers_beyond_i64_become_floats() {
        assert_eq!(
            field("18446744073709551615"),
            FieldValue::Float(18_446_744_073_709_551_615.0)
        );
    }

    #[test]
    fn key_value_splits_on_first_separator() {
        let SeparatedKeyValue((k, v)) = "expr=a=b".parse::<KeyValue>().unwrap();
        assert_eq!(k, "expr");
        assert_eq!(v, "a=b");

        let SeparatedKeyValue((k, v)) = "empty=".parse::<KeyValue>().unwrap();
        assert_eq!(k, "empty");
        assert_eq!(v, "");
    }

    #[test]
    fn key_value_errors() {
        let err = "novalue".parse::<KeyValue>().unwrap_err();
        assert_eq!(err.to_string(), "missing value");

        let err = "=v".parse::<KeyValue>().unwrap_err();
        assert_eq!(err.to_string(), "missing key");
    }

    #[test]
    fn client_config_from_flags() {
        let config = DatawayConfig::try_parse_from([
            "dataway",
            "--host",
            "http://127.0.0.1:9528",
            "--access-key",
            "ak",
            "--secret-key",
            "sk",
            "--trace-id",
            "trace",
            "--uuid",
            "uuid",
            "--sdk-version",
            "1.0",
            "--user-agent",
            "agent",
            "--disable-compression",
        ])
        .unwrap();

        let client_config = ClientConfig::from(config);
        assert_eq!(client_config.host, "http://127.0.0.1:9528");
        assert_eq!(client_config.access_key.expose_secret(), "ak");
        assert_eq!(client_config.secret_key.expose_secret(), "sk");
        assert_eq!(client_config.trace_id, "trace");
        assert_eq!(client_config.client_uuid, "uuid");
        assert_eq!(client_config.version, "1.0");
        assert_eq!(client_config.user_agent, "agent");
        assert!(client_config.disable_compression);
    }
}
