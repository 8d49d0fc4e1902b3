//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use freight_quoter::config::ServiceConfig;
use freight_quoter::http::HttpServer;
use freight_quoter::tables::TableSet;

/// Postal range fixture: SP capital, a redespacho suburb with no tariff,
/// SP interior, and Rio.
pub const POSTAL_RANGES: &str = "\
cep_inicio,cep_fim,uf,localidade,classificacao,prazo
01000-000,05999-999,SP,São Paulo,Capital,1
06000-000,09999-999,SP,Osasco,Redespacho,2
13000-000,19999-999,SP,Interior SP,Interior,3
20000-000,23799-999,RJ,Rio de Janeiro,Capital,2
";

/// Tariff fixture, keyed by destination UF: two services to the SP capital,
/// one to the SP interior. RJ and the redespacho class are deliberately
/// absent.
pub const TARIFFS: &str = "\
origem;destino;classificacao;servico;add;1,0;5,0;30,0
SP;SP;Capital;ecm;2,00;10,00;30,00;100,00
SP;SP;Capital;exp;0;20,00;60,00;180,00
SP;SP;Interior;ecm;3,50;15,00;45,00;150,00
";

/// Per-test scratch directory, keyed by the test's port so parallel tests
/// never share files.
pub fn fixture_dir(port: u16) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("freight-quoter-tests")
        .join(port.to_string());
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write the standard fixtures into `dir`.
pub fn write_fixtures(dir: &Path) {
    std::fs::write(dir.join("postal_ranges.csv"), POSTAL_RANGES).unwrap();
    std::fs::write(dir.join("tariffs.csv"), TARIFFS).unwrap();
}

/// Config pointing at the fixtures in `dir`, listening on `port`.
pub fn test_config(port: u16, dir: &Path) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = format!("127.0.0.1:{port}");
    config.data.postal_ranges_file = dir.join("postal_ranges.csv");
    config.data.tariffs_file = dir.join("tariffs.csv");
    config.data.watch = false;
    config.observability.metrics_enabled = false;
    config
}

/// Bind the listener and spawn the server, returning once it accepts
/// connections.
pub async fn spawn_server(
    config: ServiceConfig,
    tables: Arc<ArcSwapOption<TableSet>>,
    updates: mpsc::UnboundedReceiver<Arc<TableSet>>,
    shutdown: broadcast::Receiver<()>,
) -> SocketAddr {
    let addr: SocketAddr = config.listener.bind_address.parse().unwrap();
    let listener = TcpListener::bind(addr).await.unwrap();

    let server = HttpServer::new(config, tables);
    tokio::spawn(async move {
        let _ = server.run(listener, updates, shutdown).await;
    });

    addr
}

/// Non-pooled client so each test drives fresh connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
