use clap::Parser;
use dataway_client::{Client, Point, SystemProvider, Time, TimeProvider, UrlParam};
use tracing::info;

use super::common::{DatawayConfig, FieldArg, SeparatedKeyValue};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Client(#[from] dataway_client::Error),

    #[error("dataway responded with {status}: {body}")]
    Status { status: String, body: String },
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Parser)]
#[clap(visible_alias = "w")]
pub(crate) struct Config {
    /// Common dataway connection config
    #[clap(flatten)]
    dataway_config: DatawayConfig,

    /// Template route the points are written through
    #[clap(long = "route", env = "DATAWAY_ROUTE", default_value = "")]
    route: String,

    /// Workspace token
    #[clap(long = "token", env = "DATAWAY_TOKEN", default_value = "")]
    token: String,

    /// Retention policy
    #[clap(long = "shortrp", env = "DATAWAY_SHORTRP", default_value = "")]
    shortrp: String,

    /// Sign the request with the access key
    #[clap(long = "sign")]
    sign: bool,

    /// Name of the point
    #[clap(short = 'm', long = "measurement")]
    measurement: String,

    /// Tag of the point as `key=value`, may be repeated
    #[clap(short = 't', long = "tag")]
    tags: Vec<SeparatedKeyValue<String, String>>,

    /// Field of the point as `key=value`, may be repeated
    ///
    /// Values parsing as an integer are sent as integers, then those parsing
    /// as a float as floats. Anything else is sent as a string.
    #[clap(short = 'f', long = "field", required = true)]
    fields: Vec<SeparatedKeyValue<String, FieldArg>>,
}

pub(crate) async fn command(config: Config) -> Result<()> {
    let Config {
        dataway_config,
        route,
        token,
        shortrp,
        sign,
        measurement,
        tags,
        fields,
    } = config;

    let client = Client::new(dataway_config.into())?;
    let point = build_point(measurement, tags, fields, SystemProvider::new().now());
    let param = UrlParam::new(route, token, shortrp);

    let response = client.upload(&param, [&point], sign).await?;
    info!(status = %response.status, "upload finished");

    if !response.is_success() {
        return Err(Error::Status {
            status: response.status.to_string(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
        });
    }

    println!("{}", response.status);

    Ok(())
}

fn build_point(
    measurement: String,
    tags: Vec<SeparatedKeyValue<String, String>>,
    fields: Vec<SeparatedKeyValue<String, FieldArg>>,
    time: Time,
) -> Point {
    let mut builder = Point::builder(measurement, time);
    for SeparatedKeyValue((key, value)) in tags {
        builder = builder.tag(key, value);
    }
    for SeparatedKeyValue((key, FieldArg(value))) in fields {
        builder = builder.field(key, value);
    }
    builder.build()
}
