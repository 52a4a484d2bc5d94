//! Condition resolution over a Ba-Ti-O stability interval.

use mu_chem::{Element, ThermoEntry};
use mu_core::Tolerances;
use mu_phase::stability_interval;
use mu_reservoir::{Condition, Qualifier, ReservoirKey, condition_reservoirs, resolve};

fn entries() -> Vec<ThermoEntry> {
    [
        ("Ba", -2.0),
        ("Ti", -8.0),
        ("O2", -9.896),
        ("BaO", -12.0),
        ("TiO2", -27.0),
        ("BaTiO3", -42.0),
    ]
    .into_iter()
    .map(|(f, e)| ThermoEntry::from_formula(f, e, f).unwrap())
    .collect()
}

#[test]
fn bulk_reservoirs_have_three_ordered_keys() {
    let bto = "BaTiO3".parse().unwrap();
    let interval = stability_interval(&entries(), &bto, Element::O, Tolerances::hull()).unwrap();
    let res = condition_reservoirs(&interval).unwrap();

    let keys: Vec<String> = res.keys().map(ReservoirKey::to_string).collect();
    assert_eq!(keys, ["O-poor", "O-middle", "O-rich"]);

    let poor = res.get_condition("O-poor").unwrap();
    let middle = res.get_condition("O-middle").unwrap();
    let rich = res.get_condition("O-rich").unwrap();
    for (element, mid) in middle.iter() {
        let expected = (poor.get(element).unwrap() + rich.get(element).unwrap()) / 2.0;
        assert_eq!(mid, expected);
    }
    assert!((rich.get(Element::O).unwrap() + 4.948).abs() < 1e-9);
}

#[test]
fn single_condition_matches_bulk_entry() {
    let bto = "BaTiO3".parse().unwrap();
    let ti = "Ti".parse().unwrap();
    let interval = stability_interval(&entries(), &bto, ti, Tolerances::hull()).unwrap();
    let condition: Condition = "Ti-middle".parse().unwrap();
    assert_eq!(condition.qualifier, Qualifier::Middle);

    let single = resolve(&interval, condition.qualifier).unwrap();
    let bulk = condition_reservoirs(&interval).unwrap();
    assert_eq!(Some(&single), bulk.get_condition("Ti-middle"));
    // (V1 + V5) / 2 for Ti.
    assert!((single.get(ti).unwrap() - (-20.104 - 8.0) / 2.0).abs() < 1e-9);
}

#[test]
fn reservoirs_round_trip_through_yaml() {
    let bto = "BaTiO3".parse().unwrap();
    let interval = stability_interval(&entries(), &bto, Element::O, Tolerances::hull()).unwrap();
    let res = condition_reservoirs(&interval).unwrap();
    let yaml = serde_yaml::to_string(&res).unwrap();
    let back: mu_reservoir::Reservoirs = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back.len(), 3);
    let keys: Vec<String> = back.keys().map(ReservoirKey::to_string).collect();
    assert_eq!(keys, ["O-poor", "O-middle", "O-rich"]);
}
