//! FS chain consensus settings.
//!
//! Parses the `morph.consensus` section used when the Inner Ring runs the
//! chain's consensus itself, plus the deployment mode switches.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{optional, ConfigError};
use crate::getters::to_u64;
use crate::keys::PublicKey;
use crate::tree::Config;

const ROOT_SECTION: &str = "morph.consensus";

/// Largest value accepted for 32-bit signed settings.
const MAX_I32: u64 = i32::MAX as u64;

/// Blockchain storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// BoltDB file.
    BoltDb {
        /// Database file path.
        path: String,
    },
    /// LevelDB directory.
    LevelDb {
        /// Database directory path.
        path: String,
    },
    /// Volatile in-memory storage.
    InMemory,
}

/// TLS listener settings of the RPC server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Whether the TLS listener is enabled.
    pub enabled: bool,
    /// Addresses to listen on.
    pub addresses: Vec<String>,
    /// Certificate file.
    pub cert_file: String,
    /// Private key file.
    pub key_file: String,
}

/// RPC server settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Insecure listen addresses.
    pub addresses: Vec<String>,
    /// TLS listener.
    pub tls: TlsConfig,
}

/// P2P ping settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingConfig {
    /// Ping interval.
    pub interval: Option<Duration>,
    /// Ping timeout.
    pub timeout: Option<Duration>,
}

/// P2P settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct P2pConfig {
    /// Dial timeout.
    pub dial_timeout: Option<Duration>,
    /// Protocol tick interval.
    pub proto_tick_interval: Option<Duration>,
    /// Listen addresses.
    pub listen_addresses: Vec<String>,
    /// Minimum number of peers.
    pub min_peers: Option<u32>,
    /// Maximum number of peers.
    pub max_peers: Option<u32>,
    /// Number of connection attempts.
    pub attempt_conn_peers: Option<u32>,
    /// Ping settings.
    pub ping: PingConfig,
}

/// Consensus settings of the locally run FS chain.
///
/// Optional settings left unset are `None` or empty and take the chain
/// node's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Network magic.
    pub network_magic: u32,
    /// Storage backend.
    pub storage: StorageConfig,
    /// Committee members.
    pub committee: Vec<PublicKey>,
    /// Block interval.
    pub block_interval: Option<Duration>,
    /// Number of blocks kept traceable.
    pub traceable_chain_length: Option<u32>,
    /// Seed node addresses.
    pub seed_nodes: Vec<String>,
    /// Hard fork name to activation height.
    pub hard_forks: BTreeMap<String, u32>,
    /// Height to validator count.
    pub validators_history: BTreeMap<u32, u32>,
    /// RPC server settings.
    pub rpc: RpcConfig,
    /// P2P settings.
    pub p2p: P2pConfig,
}

/// Returns true if the node runs the FS chain consensus itself.
#[must_use]
pub fn is_local_consensus_mode(cfg: &Config) -> bool {
    !cfg.is_set("morph.endpoints")
}

/// Returns true if the node deploys the FS chain contracts on its own.
///
/// # Errors
///
/// Returns an error if the flag is set but is not a boolean.
pub fn is_auto_deployment_mode(cfg: &Config) -> Result<bool, ConfigError> {
    Ok(optional(cfg.bool("fschain_autodeploy", "flag to auto-deploy the FS chain"))?.unwrap_or(false))
}

/// Parses the `morph.consensus` section.
///
/// # Errors
///
/// Returns an error naming the first missing or malformed setting.
pub fn parse_consensus_config(cfg: &Config) -> Result<ConsensusConfig, ConfigError> {
    if !cfg.is_set(ROOT_SECTION) {
        return Err(ConfigError::MissingSection(ROOT_SECTION.to_string()));
    }
    let c = cfg.sub(ROOT_SECTION);

    let magic = c.uint64_range("magic", "network magic", 1, u64::from(u32::MAX))?;
    let network_magic = narrow(&c, "magic", "network magic", magic)?;

    let storage = parse_storage(&c)?;

    let committee = c.public_keys("committee", "committee members")?;
    if committee.is_empty() {
        return Err(ConfigError::EmptyCommittee(c.full_key("committee")));
    }

    let block_interval = optional(c.duration_positive("time_per_block", "block interval"))?;

    let traceable_chain_length = optional(c.uint64_range(
        "max_traceable_blocks",
        "traceable chain length",
        1,
        u64::from(u32::MAX),
    ))?
    .map(|v| narrow(&c, "max_traceable_blocks", "traceable chain length", v))
    .transpose()?;

    let seed_nodes = optional(c.addresses_tcp("seed_nodes", "seed nodes"))?.unwrap_or_default();

    let hard_forks = if c.is_set("hardforks") {
        c.map_uint32("hardforks", "hard forks", u64::from(u32::MAX))?
    } else {
        BTreeMap::new()
    };

    let validators_history = if c.is_set("validators_history") {
        parse_validators_history(&c)?
    } else {
        BTreeMap::new()
    };

    let rpc = if c.is_set("rpc") {
        parse_rpc(&c.sub("rpc"))?
    } else {
        RpcConfig::default()
    };
    let p2p = if c.is_set("p2p") {
        parse_p2p(&c.sub("p2p"), committee.len())?
    } else {
        P2pConfig::default()
    };

    Ok(ConsensusConfig {
        network_magic,
        storage,
        committee,
        block_interval,
        traceable_chain_length,
        seed_nodes,
        hard_forks,
        validators_history,
        rpc,
        p2p,
    })
}

fn narrow(c: &Config, key: &str, desc: &str, v: u64) -> Result<u32, ConfigError> {
    u32::try_from(v)
        .map_err(|_| ConfigError::invalid(desc, &c.full_key(key), "unsigned integer", "value overflows uint32"))
}

fn parse_storage(c: &Config) -> Result<StorageConfig, ConfigError> {
    if !c.is_set("storage") {
        return Err(ConfigError::MissingStorageSection(c.full_key("storage")));
    }
    let type_key = c.full_key("storage.type");
    let Some(typ) = optional(c.string("storage.type", "storage type"))? else {
        return Err(ConfigError::MissingStorageType(type_key));
    };

    let path = |engine: &'static str| -> Result<String, ConfigError> {
        optional(c.string("storage.path", "storage path"))?.ok_or_else(|| ConfigError::MissingStoragePath {
            engine,
            key: c.full_key("storage.path"),
        })
    };

    match typ.as_str() {
        "boltdb" => Ok(StorageConfig::BoltDb { path: path("BoltDB")? }),
        "leveldb" => Ok(StorageConfig::LevelDb { path: path("LevelDB")? }),
        "inmemory" => Ok(StorageConfig::InMemory),
        _ => Err(ConfigError::UnsupportedStorage {
            key: type_key,
            value: typ,
        }),
    }
}

fn parse_validators_history(c: &Config) -> Result<BTreeMap<u32, u32>, ConfigError> {
    let mut history = BTreeMap::new();
    c.map("validators_history", "validators history", |name, value| {
        let height: u32 = name
            .parse()
            .map_err(|e| format!("parse unsigned integer: {e}"))?;
        let count = to_u64(value)?;
        if count > MAX_I32 {
            return Err(format!("value {count} is out of allowable range"));
        }
        let count = u32::try_from(count).map_err(|e| e.to_string())?;
        history.insert(height, count);
        Ok(())
    })?;
    Ok(history)
}

fn parse_rpc(c: &Config) -> Result<RpcConfig, ConfigError> {
    let mut rpc = RpcConfig::default();
    rpc.addresses = optional(c.addresses_tcp(
        "listen",
        "network addresses to listen insecure Neo RPC on",
    ))?
    .unwrap_or_default();

    let tls = c.sub("tls");
    if optional(tls.bool("enabled", "RPC TLS switch"))?.unwrap_or(false) {
        rpc.tls.enabled = true;
        rpc.tls.addresses =
            tls.addresses_tcp("listen", "network addresses to listen to Neo RPC over TLS")?;

        rpc.tls.cert_file = optional(tls.string("cert_file", "RPC TLS certificate"))?
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingTlsFile {
                what: "certificate",
                key: tls.full_key("cert_file"),
            })?;
        rpc.tls.key_file = optional(tls.string("key_file", "RPC TLS key"))?
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingTlsFile {
                what: "key",
                key: tls.full_key("key_file"),
            })?;
    }
    Ok(rpc)
}

fn parse_p2p(c: &Config, committee_size: usize) -> Result<P2pConfig, ConfigError> {
    let mut p2p = P2pConfig::default();
    p2p.dial_timeout = optional(c.duration_positive("dial_timeout", "P2P dial timeout"))?;
    p2p.proto_tick_interval = optional(c.duration_positive(
        "proto_tick_interval",
        "P2P protocol tick interval",
    ))?;
    p2p.listen_addresses = optional(c.addresses_tcp("listen", "network addresses to listen Neo P2P on"))?
        .unwrap_or_default();

    if c.is_set("peers") {
        let min = match optional(c.uint64_max("peers.min", "minimum number of P2P peers", MAX_I32))? {
            Some(min) => min,
            // explicit zero is a valid setting, so the default applies to absence only
            None => default_min_peers(committee_size),
        };
        p2p.min_peers = Some(narrow(c, "peers.min", "minimum number of P2P peers", min)?);

        p2p.max_peers = optional(c.uint64_range("peers.max", "maximum number of P2P peers", 1, MAX_I32))?
            .map(|v| narrow(c, "peers.max", "maximum number of P2P peers", v))
            .transpose()?;
        p2p.attempt_conn_peers = optional(c.uint64_range(
            "peers.attempts",
            "number of P2P connection attempts",
            1,
            MAX_I32,
        ))?
        .map(|v| narrow(c, "peers.attempts", "number of P2P connection attempts", v))
        .transpose()?;
    }

    if c.is_set("ping") {
        p2p.ping.interval = Some(c.duration_positive("ping.interval", "P2P ping interval")?);
        p2p.ping.timeout = Some(c.duration_positive("ping.timeout", "P2P ping timeout")?);
    }

    Ok(p2p)
}

/// Minimum peers needed to reach consensus in a committee of `n`.
#[must_use]
pub const fn default_min_peers(n: usize) -> u64 {
    let n = n as u64;
    if n == 0 {
        return 0;
    }
    n - (n - 1) / 3 - 1
}

/// Name Service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NnsConfig {
    /// Email of the system domains' owner.
    pub system_email: String,
}

/// Parses the `nns` section.
///
/// # Errors
///
/// Returns an error if the section or the system email is absent.
pub fn parse_nns_config(cfg: &Config) -> Result<NnsConfig, ConfigError> {
    const ROOT: &str = "nns";

    if !cfg.is_set(ROOT) {
        return Err(ConfigError::MissingSection(ROOT.to_string()));
    }

    Ok(NnsConfig {
        system_email: cfg.sub(ROOT).string("system_email", "system email for NNS")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const KEY_A: &str = "02b3622bf4017bdfe317c58aed5f4c753f206b7db896046fa7d774bbc4bf7f8dc2";
    const KEY_B: &str = "03d90c07df63e690ce77912e10ab51acc944b66860237b608c4f8f8309e71ee699";
    const KEY_C: &str = "02a7bc55fe8684e0119768d104ba30795bdcc86619e864add26156723ed185cd62";
    const KEY_D: &str = "02103a7f7dd016558597f7960d27c516a4394fd968b9e65155eb4b013e4040406e";

    fn minimal() -> Value {
        json!({
            "morph": {
                "consensus": {
                    "magic": 15405,
                    "storage": {"type": "inmemory"},
                    "committee": [KEY_A, KEY_B, KEY_C, KEY_D],
                }
            }
        })
    }

    fn cfg(document: Value) -> Config {
        Config::with_env(document, Vec::new())
    }

    #[test]
    fn test_minimal_consensus() {
        let c = parse_consensus_config(&cfg(minimal())).expect("consensus");

        assert_eq!(c.network_magic, 15405);
        assert_eq!(c.storage, StorageConfig::InMemory);
        assert_eq!(c.committee.len(), 4);
        assert_eq!(c.block_interval, None);
        assert!(c.seed_nodes.is_empty());
        assert_eq!(c.p2p, P2pConfig::default());
        assert_eq!(c.rpc, RpcConfig::default());
    }

    #[test]
    fn test_full_consensus() {
        let mut doc = minimal();
        doc["morph"]["consensus"] = json!({
            "magic": 15405,
            "storage": {"type": "boltdb", "path": "/var/lib/chain.bolt"},
            "committee": [KEY_A, KEY_B, KEY_C, KEY_D],
            "time_per_block": "1s",
            "max_traceable_blocks": 17280,
            "seed_nodes": ["localhost:20000", "localhost:20001"],
            "hardforks": {"Aspidochelone": 100},
            "validators_history": {"0": 4, "12": 7},
            "rpc": {
                "listen": ["localhost:30000"],
                "tls": {
                    "enabled": true,
                    "listen": ["localhost:30001"],
                    "cert_file": "/path/to/cert",
                    "key_file": "/path/to/key",
                },
            },
            "p2p": {
                "dial_timeout": "1m",
                "proto_tick_interval": "2s",
                "listen": ["localhost:20100"],
                "peers": {"min": 1, "max": 10, "attempts": 5},
                "ping": {"interval": "30s", "timeout": "90s"},
            },
        });

        let c = parse_consensus_config(&cfg(doc)).expect("consensus");

        assert_eq!(
            c.storage,
            StorageConfig::BoltDb {
                path: "/var/lib/chain.bolt".to_string()
            }
        );
        assert_eq!(c.block_interval, Some(Duration::from_secs(1)));
        assert_eq!(c.traceable_chain_length, Some(17280));
        assert_eq!(c.seed_nodes.len(), 2);
        assert_eq!(c.hard_forks.get("Aspidochelone"), Some(&100));
        assert_eq!(c.validators_history.get(&12), Some(&7));
        assert!(c.rpc.tls.enabled);
        assert_eq!(c.rpc.tls.key_file, "/path/to/key");
        assert_eq!(c.p2p.dial_timeout, Some(Duration::from_secs(60)));
        assert_eq!(c.p2p.min_peers, Some(1));
        assert_eq!(c.p2p.max_peers, Some(10));
        assert_eq!(c.p2p.attempt_conn_peers, Some(5));
        assert_eq!(c.p2p.ping.timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_missing_root_section() {
        let err = parse_consensus_config(&cfg(json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "missing root section 'morph.consensus'");
    }

    #[test]
    fn test_magic_out_of_range() {
        let mut doc = minimal();
        doc["morph"]["consensus"]["magic"] = json!(0);

        let err = parse_consensus_config(&cfg(doc)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid network magic 'morph.consensus.magic' (unsigned integer): out of allowable range [1:4294967295]"
        );
    }

    #[test]
    fn test_storage_errors() {
        let mut doc = minimal();
        doc["morph"]["consensus"]["storage"] = json!({"type": "leveldb"});
        let err = parse_consensus_config(&cfg(doc.clone())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing path to the LevelDB 'morph.consensus.storage.path'"
        );

        doc["morph"]["consensus"]["storage"] = json!({"type": "rocksdb"});
        let err = parse_consensus_config(&cfg(doc.clone())).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedStorage { .. }));

        doc["morph"]["consensus"]["storage"] = json!({"path": "/x"});
        let err = parse_consensus_config(&cfg(doc)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingStorageType(_)));
    }

    #[test]
    fn test_empty_committee() {
        let mut doc = minimal();
        doc["morph"]["consensus"]["committee"] = json!([]);

        let err = parse_consensus_config(&cfg(doc)).unwrap_err();
        assert_eq!(err, ConfigError::EmptyCommittee("morph.consensus.committee".to_string()));
    }

    #[test]
    fn test_default_min_peers() {
        let mut doc = minimal();
        doc["morph"]["consensus"]["p2p"] = json!({"peers": {"max": 5}});

        let c = parse_consensus_config(&cfg(doc)).expect("consensus");
        assert_eq!(c.p2p.min_peers, Some(2));

        assert_eq!(default_min_peers(1), 0);
        assert_eq!(default_min_peers(4), 2);
        assert_eq!(default_min_peers(7), 4);
    }

    #[test]
    fn test_explicit_zero_min_peers() {
        let mut doc = minimal();
        doc["morph"]["consensus"]["p2p"] = json!({"peers": {"min": 0}});

        let c = parse_consensus_config(&cfg(doc)).expect("consensus");
        assert_eq!(c.p2p.min_peers, Some(0));
    }

    #[test]
    fn test_tls_requires_files() {
        let mut doc = minimal();
        doc["morph"]["consensus"]["rpc"] = json!({
            "tls": {"enabled": true, "listen": ["localhost:1"], "cert_file": "/c"},
        });

        let err = parse_consensus_config(&cfg(doc)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "RPC TLS setup is enabled but no key ('morph.consensus.rpc.tls.key_file') is provided"
        );
    }

    #[test]
    fn test_ping_requires_both() {
        let mut doc = minimal();
        doc["morph"]["consensus"]["p2p"] = json!({"ping": {"interval": "1s"}});

        assert!(parse_consensus_config(&cfg(doc)).unwrap_err().is_missing());
    }

    #[test]
    fn test_validators_history_limit() {
        let mut doc = minimal();
        doc["morph"]["consensus"]["validators_history"] = json!({"10": 2_147_483_648u64});

        let err = parse_consensus_config(&cfg(doc)).unwrap_err();
        assert!(err.to_string().contains("invalid element '10'"));
    }

    #[test]
    fn test_modes() {
        let local = cfg(json!({"fschain_autodeploy": true}));
        assert!(is_local_consensus_mode(&local));
        assert_eq!(is_auto_deployment_mode(&local), Ok(true));

        let remote = cfg(json!({"morph": {"endpoints": ["wss://rpc:30333/ws"]}}));
        assert!(!is_local_consensus_mode(&remote));
        assert_eq!(is_auto_deployment_mode(&remote), Ok(false));

        let broken = cfg(json!({"fschain_autodeploy": "maybe"}));
        assert!(is_auto_deployment_mode(&broken).is_err());
    }

    #[test]
    fn test_nns_config() {
        let c = parse_nns_config(&cfg(json!({"nns": {"system_email": "ops@example.org"}}))).expect("nns");
        assert_eq!(c.system_email, "ops@example.org");

        assert!(matches!(
            parse_nns_config(&cfg(json!({}))),
            Err(ConfigError::MissingSection(_))
        ));
        assert!(parse_nns_config(&cfg(json!({"nns": {"other": 1}}))).unwrap_err().is_missing());
    }
}
