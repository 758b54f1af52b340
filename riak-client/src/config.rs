//! Client configuration types and builders.

use std::time::Duration;

/// Default binary protocol port.
const DEFAULT_PB_PORT: u16 = 8087;
/// Default HTTP interface port.
const DEFAULT_HTTP_PORT: u16 = 8098;
/// Default number of pooled connections per node.
const DEFAULT_POOL_SIZE: usize = 5;
/// Default connect timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(4);
/// Default socket read deadline.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
/// Default socket write deadline.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);
/// Default idle lifetime of a pooled connection.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);
/// Default cool-down window for a node marked offline.
const DEFAULT_NODE_COOLDOWN: Duration = Duration::from_secs(5);

/// Configuration error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for a single Riak node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    name: String,
    host: String,
    pb_port: u16,
    http_port: u16,
    pool_size: usize,
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    idle_timeout: Duration,
}

impl NodeConfig {
    /// Starts building a node configuration for the given host.
    pub fn builder(host: impl Into<String>) -> NodeConfigBuilder {
        NodeConfigBuilder::new(host)
    }

    /// Returns the node's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node's hostname or address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the binary protocol port.
    pub fn pb_port(&self) -> u16 {
        self.pb_port
    }

    /// Returns the HTTP interface port.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Returns the connection pool capacity for this node.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Returns the connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the socket read deadline.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Returns the socket write deadline.
    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Returns the idle lifetime after which a pooled connection is
    /// discarded instead of reused.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Returns the `host:port` address of the binary protocol endpoint.
    pub fn pb_address(&self) -> String {
        format!("{}:{}", self.host, self.pb_port)
    }

    /// Returns the base URL of the HTTP interface.
    pub fn http_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.http_port)
    }
}

/// Builder for [`NodeConfig`].
#[derive(Debug, Clone)]
pub struct NodeConfigBuilder {
    name: Option<String>,
    host: String,
    pb_port: u16,
    http_port: u16,
    pool_size: usize,
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    idle_timeout: Duration,
}

impl NodeConfigBuilder {
    /// Creates a new builder for the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            name: None,
            host: host.into(),
            pb_port: DEFAULT_PB_PORT,
            http_port: DEFAULT_HTTP_PORT,
            pool_size: DEFAULT_POOL_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Sets the node's display name. Defaults to `host:pb_port`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the binary protocol port.
    pub fn pb_port(mut self, port: u16) -> Self {
        self.pb_port = port;
        self
    }

    /// Sets the HTTP interface port.
    pub fn http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    /// Sets the connection pool capacity.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the socket read deadline.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the socket write deadline.
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Sets the idle lifetime of pooled connections.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Validates the settings and builds the configuration.
    pub fn build(self) -> Result<NodeConfig, ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::new("node host cannot be empty"));
        }
        if self.pool_size == 0 {
            return Err(ConfigError::new("pool_size must be at least 1"));
        }

        let name = self
            .name
            .unwrap_or_else(|| format!("{}:{}", self.host, self.pb_port));

        Ok(NodeConfig {
            name,
            host: self.host,
            pb_port: self.pb_port,
            http_port: self.http_port,
            pool_size: self.pool_size,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
            idle_timeout: self.idle_timeout,
        })
    }
}

/// Configuration for a Riak cluster: the node list plus dispatch settings.
///
/// The node list is fixed at build time; the client performs no topology
/// discovery.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    nodes: Vec<NodeConfig>,
    retries: u32,
    node_cooldown: Duration,
}

impl ClusterConfig {
    /// Starts building a cluster configuration.
    pub fn builder() -> ClusterConfigBuilder {
        ClusterConfigBuilder::new()
    }

    /// Returns the configured nodes.
    pub fn nodes(&self) -> &[NodeConfig] {
        &self.nodes
    }

    /// Returns the retry count for retryable failures. `0` means a single
    /// attempt.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns the cool-down window applied to a node marked offline.
    pub fn node_cooldown(&self) -> Duration {
        self.node_cooldown
    }
}

/// Builder for [`ClusterConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClusterConfigBuilder {
    nodes: Vec<NodeConfig>,
    retries: u32,
    node_cooldown: Option<Duration>,
}

impl ClusterConfigBuilder {
    /// Creates a new cluster configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the cluster.
    pub fn add_node(mut self, node: NodeConfig) -> Self {
        self.nodes.push(node);
        self
    }

    /// Sets the cluster nodes, replacing any previously added.
    pub fn nodes(mut self, nodes: impl IntoIterator<Item = NodeConfig>) -> Self {
        self.nodes = nodes.into_iter().collect();
        self
    }

    /// Sets the retry count for retryable failures.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the cool-down window for nodes marked offline.
    pub fn node_cooldown(mut self, cooldown: Duration) -> Self {
        self.node_cooldown = Some(cooldown);
        self
    }

    /// Validates the settings and builds the configuration.
    pub fn build(self) -> Result<ClusterConfig, ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::new("cluster must have at least one node"));
        }

        Ok(ClusterConfig {
            nodes: self.nodes,
            retries: self.retries,
            node_cooldown: self.node_cooldown.unwrap_or(DEFAULT_NODE_COOLDOWN),
        })
    }
}
