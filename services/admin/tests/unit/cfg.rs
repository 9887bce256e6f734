use bazaar_common::config::{App3rdPartyCfg, AppCfgHardLimit, AppConfig, AppDataStoreCfg};
use bazaar_common::error::AppErrorCode;

use super::ut_example_path;

fn ut_hard_limit() -> AppCfgHardLimit {
    AppCfgHardLimit {
        num_db_conns: 10,
        seconds_db_idle: 120,
    }
}

#[test]
fn cfg_parse_complete_file() {
    let path = ut_example_path("app_cfg_ut.json");
    let result = AppConfig::parse_from_file(path, ut_hard_limit());
    let cfg = result.unwrap();
    assert_eq!(cfg.listen.api_version.as_str(), "0.0.1");
    assert_eq!(cfg.listen.port, 8012u16);
    assert_eq!(cfg.listen.routes.len(), 17);
    assert_eq!(cfg.num_workers, 2u8);
    let AppDataStoreCfg::DbServer(d) = cfg.data_store.first().unwrap();
    assert_eq!(d.alias.as_str(), "store-primary");
    assert_eq!(d.max_conns, 8u32);
    let labels = cfg
        .third_parties
        .iter()
        .map(|c| c.label().to_string())
        .collect::<Vec<_>>();
    assert!(labels.contains(&"easyparcel".to_string()));
    assert!(labels.contains(&"mailer".to_string()));
    assert!(labels.contains(&"telegram".to_string()));
    let all_test_mode = cfg
        .third_parties
        .iter()
        .all(|c| matches!(c.as_ref(), App3rdPartyCfg::test { .. }));
    assert!(all_test_mode);
    assert_eq!(cfg.auth.update_interval_minutes, 60u32);
}

#[test]
fn cfg_reject_empty_route_table() {
    let path = ut_example_path("app_cfg_noroute_ut.json");
    let result = AppConfig::parse_from_file(path, ut_hard_limit());
    let error = result.err().unwrap();
    assert_eq!(error.code, AppErrorCode::NoRouteApiServerCfg);
}

#[test]
fn cfg_reject_db_conns_exceeding_limit() {
    let path = ut_example_path("app_cfg_ut.json");
    let limit = AppCfgHardLimit {
        num_db_conns: 4, // example file asks for 8
        seconds_db_idle: 120,
    };
    let result = AppConfig::parse_from_file(path, limit);
    let error = result.err().unwrap();
    assert_eq!(error.code, AppErrorCode::ExceedingMaxLimit);
}

#[test]
fn cfg_missing_file() {
    let path = ut_example_path("no-such-config.json");
    let result = AppConfig::parse_from_file(path, ut_hard_limit());
    let error = result.err().unwrap();
    assert!(matches!(error.code, AppErrorCode::IOerror(_)));
}
