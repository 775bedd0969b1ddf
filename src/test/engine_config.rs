use crate::error::ModelError;
use crate::flow::{Accounting, EngineConfig, ExpansionRule, PathRefresh};
use crate::route::RoutingPolicy;
use crate::topo::{LinkClass, LinkLayout};

#[test]
fn defaults_match_aries_parameters() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.layout, LinkLayout::default());
    assert_eq!(cfg.layout.per_router(), 42);
    assert_eq!(cfg.link_bw(LinkClass::Blue), 5120.0);
    assert_eq!(cfg.pci_bw, 16384.0);
    assert_eq!(cfg.cutoff, 0.01);
    assert_eq!(cfg.ramp_iters, 50);
    assert_eq!(cfg.paths_per_message, 4);
    assert_eq!(cfg.max_iters, 200);
    assert_eq!(cfg.routing, RoutingPolicy::Biased { direct: 2 });
    assert_eq!(cfg.refresh, PathRefresh::EveryIteration);
    assert_eq!(cfg.accounting, Accounting::TwoRound);
    assert_eq!(cfg.expansion, ExpansionRule::Sticky);
    assert_eq!(cfg.link_increment(LinkClass::Green), 102.4);
    assert!(cfg.validate().is_ok());
}

#[test]
fn json_params_fill_missing_fields_with_defaults() {
    let cfg: EngineConfig = serde_json::from_str(
        r#"{
            "blue_bw": 2560.0,
            "routing": { "kind": "valiant" },
            "accounting": "retained",
            "expansion": "reconsider",
            "layout": { "green": 4, "black": 4, "blue": 2 }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.blue_bw, 2560.0);
    assert_eq!(cfg.green_bw, 5120.0);
    assert_eq!(cfg.routing, RoutingPolicy::Valiant);
    assert_eq!(cfg.accounting, Accounting::Retained);
    assert_eq!(cfg.expansion, ExpansionRule::Reconsider);
    assert_eq!(cfg.layout.per_router(), 10);

    let cfg: EngineConfig =
        serde_json::from_str(r#"{ "routing": { "kind": "biased", "direct": 1 } }"#).unwrap();
    assert_eq!(cfg.routing, RoutingPolicy::Biased { direct: 1 });
}

#[test]
fn validate_rejects_non_positive_bandwidth_and_counts() {
    let cases = [
        EngineConfig {
            pci_bw: 0.0,
            ..EngineConfig::default()
        },
        EngineConfig {
            green_bw: f64::NAN,
            ..EngineConfig::default()
        },
        EngineConfig {
            cutoff: -1.0,
            ..EngineConfig::default()
        },
        EngineConfig {
            ramp_iters: 0,
            ..EngineConfig::default()
        },
        EngineConfig {
            paths_per_message: 0,
            ..EngineConfig::default()
        },
    ];
    for cfg in cases {
        assert!(matches!(cfg.validate(), Err(ModelError::Params(_))), "{cfg:?}");
    }
}
