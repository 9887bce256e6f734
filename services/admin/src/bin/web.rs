use std::collections::HashMap;
use std::env;

use actix_web::rt;

use bazaar_common::config::{AppCfgHardLimit, AppCfgInitArgs, AppConfig};
use bazaar_common::constant::env_vars::EXPECTED_LABELS;

use admin::api::web::AppRouteTable;
use admin::network::{app_web_service, net_server_listener};
use admin::{hard_limit, AppSharedState};

fn main() {
    let cfg = {
        let iter = env::vars().filter(|(k, _v)| EXPECTED_LABELS.contains(&k.as_str()));
        let env_var_map = HashMap::from_iter(iter);
        let limit = AppCfgHardLimit {
            num_db_conns: hard_limit::MAX_DB_CONNECTIONS,
            seconds_db_idle: hard_limit::MAX_SECONDS_DB_IDLE,
        };
        match AppConfig::new(AppCfgInitArgs { env_var_map, limit }) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("[ERROR] config load failure, {e:?}");
                std::process::exit(1);
            }
        }
    };
    let api_version = cfg.api_server.listen.api_version.clone();
    let host = cfg.api_server.listen.host.clone();
    let port = cfg.api_server.listen.port;
    let num_workers = cfg.api_server.num_workers as usize;
    let cors_origin = cfg.api_server.listen.cors.clone();
    let route_pairs = cfg
        .api_server
        .listen
        .routes
        .iter()
        .map(|r| (r.path.clone(), r.handler.clone()))
        .collect::<Vec<_>>();
    let shr_state = match AppSharedState::new(cfg) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("[ERROR] shared-state init failure, {e:?}");
            std::process::exit(1);
        }
    };
    /*
     * a fresh `App` instance is created on each server worker thread, the
     * shared state is initialised once out here and cloned into the
     * factory closure, by doing so the closure stays `Fn` instead of
     * `FnOnce`
     * */
    let app_init = move || {
        let route_table = AppRouteTable::get(api_version.as_str());
        let (app, num_applied) = app_web_service(
            route_table,
            route_pairs.clone(),
            cors_origin.clone(),
            shr_state.clone(),
        );
        if num_applied == 0 {
            eprintln!("[WARN] no route applied, check the `routes` config section");
        }
        app
    };
    let ht_srv = net_server_listener(app_init, host.as_str(), port, num_workers);
    let runner = rt::System::new();
    let _result = runner.block_on(ht_srv.run());
} // end of fn main
