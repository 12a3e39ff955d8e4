use reqwest::{header::LINK, Client};
use std::time::Duration;
use tracing::debug;

use crate::{
    configuration::Config,
    error::{self, Error},
    types::HubRequest,
};

const USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct HTTP {
    pub config: Config,
    pub http: Client,
}

impl HTTP {
    pub fn new(config: Config) -> Result<HTTP, Error> {
        let http = match Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(USER_AGENT)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                return Err(error::Error::ReqwestError(e));
            },
        };

        Ok(HTTP { config, http })
    }

    /// Issues a HEAD request and returns every `Link` header value.
    pub async fn get_link_headers(
        &self,
        url: &str,
    ) -> Result<Vec<String>, Error> {
        let response = self.http.head(url).send().await?;
        debug!("HEAD {} answered {}", url, response.status());

        let links = response
            .headers()
            .get_all(LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_owned)
            .collect();

        Ok(links)
    }

    /// Posts a form encoded subscription request and returns the status.
    pub async fn post_hub_request(
        &self,
        hub: &str,
        request: &HubRequest,
    ) -> Result<u16, Error> {
        let response = self.http.post(hub).form(request).send().await?;
        let status = response.status().as_u16();
        debug!("POST {} ({}) answered {}", hub, request.mode, status);

        Ok(status)
    }
}
