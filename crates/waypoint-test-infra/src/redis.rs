use crate::{Result, TestInfraError};
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use waypoint_storage::feed::NOTIFY_KEYSPACE_EVENTS;

const READY_ATTEMPTS: u32 = 50;
const READY_POLL: Duration = Duration::from_millis(100);

/// A disposable Redis server with keyspace notifications enabled.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
    url: String,
}

impl RedisServer {
    pub async fn start() -> Result<Self> {
        let container = GenericImage::new("redis", "8.6.0")
            .with_exposed_port(6379_u16.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .with_cmd([
                "redis-server",
                "--notify-keyspace-events",
                NOTIFY_KEYSPACE_EVENTS,
            ])
            .start()
            .await?;

        let host = match container.get_host().await?.to_string().as_str() {
            "localhost" => String::from("127.0.0.1"),
            other => other.to_string(),
        };
        let port = container.get_host_port_ipv4(6379).await?;
        let url = format!("redis://{}:{}", host, port);

        let server = Self { container, url };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Polls with `PING` until the server answers; the startup log line can
    /// precede the listener.
    async fn wait_until_ready(&self) -> Result<()> {
        let client = redis::Client::open(self.url.as_str())?;
        let mut attempt = 1;
        loop {
            let ping = match client.get_multiplexed_async_connection().await {
                Ok(mut conn) => redis::cmd("PING").query_async::<String>(&mut conn).await,
                Err(e) => Err(e),
            };
            match ping {
                Ok(_) => return Ok(()),
                Err(e) if attempt >= READY_ATTEMPTS => {
                    return Err(TestInfraError::NotReady {
                        url: self.url.clone(),
                        waited: READY_POLL * READY_ATTEMPTS,
                        last_error: e,
                    });
                }
                Err(_) => {
                    attempt += 1;
                    tokio::time::sleep(READY_POLL).await;
                }
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let client = redis::Client::open(self.url.as_str())?;
        Ok(client.get_multiplexed_async_connection().await?)
    }

    /// Returns the underlying container reference.
    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }
}
