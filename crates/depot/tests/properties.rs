use depot::{Configuration, FileSystem, Lookup, filters};
use proptest::prelude::*;
use tempfile::TempDir;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn define_get_round_trip(name in name(), root in "/[a-z]{1,8}", max in 1u64..1_000_000) {
        let fs = FileSystem::new();
        let config = Configuration::new("memory")
            .path(&root)
            .option("max_size", max)
            .filters([filters::validate(), filters::max_size(max)]);

        fs.define(name.as_str(), config.clone()).unwrap();
        prop_assert_eq!(fs.get(&name), Lookup::Found(config));
    }

    #[test]
    fn reset_forgets_every_name(names in proptest::collection::vec(name(), 1..6)) {
        let fs = FileSystem::new();
        for name in &names {
            fs.define(name.as_str(), Configuration::new("memory")).unwrap();
        }
        fs.reset();
        for name in &names {
            prop_assert_eq!(fs.get(name), Lookup::Empty);
            prop_assert!(fs.resolve(name).is_err());
        }
    }

    #[test]
    fn write_read_round_trip(
        segments in proptest::collection::vec("[a-zA-Z0-9_]{1,10}", 1..4),
        data in proptest::collection::vec(any::<u8>(), 0..512),
        rooted in any::<bool>(),
    ) {
        let temp = TempDir::new().unwrap();
        let fs = FileSystem::new();
        fs.define("local", Configuration::new("local").path(temp.path())).unwrap();

        let relative = segments.join("/");
        let filename = if rooted { format!("/{relative}") } else { relative.clone() };

        let path = fs.write("local", &filename, data.clone()).unwrap();
        prop_assert_eq!(path, temp.path().canonicalize().unwrap().join(&relative));
        prop_assert_eq!(fs.read("local", &relative).unwrap(), data);
    }
}
