//! Testcontainer configurations for integration tests.

use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::redis::Redis;

/// Redis container for remote backend tests.
pub struct RedisContainer {
    #[allow(dead_code)] // Kept to maintain container lifetime
    container: ContainerAsync<Redis>,
    addr: String,
}

impl RedisContainer {
    pub async fn start() -> anyhow::Result<Self> {
        let container = Redis::default().with_tag("7-alpine").start().await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(6379).await?;

        let addr = format!("{}:{}", host, port);

        Ok(Self { container, addr })
    }

    /// Address as `host:port`.
    pub fn addr(&self) -> &str {
        &self.addr
    }
}
