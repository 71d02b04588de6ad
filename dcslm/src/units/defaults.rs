//! Built-in unit definitions.

use super::UnitInfo;

/// Units known without any user configuration.
pub(super) fn default_units() -> Vec<UnitInfo> {
    vec![
        UnitInfo::new(
            "a-10a",
            "A-10A",
            ["A-10A", "A-10C", "A-10CII"],
            ["a-10a", "a 10a", "a-10a warthog"],
        ),
        UnitInfo::new(
            "a-10c",
            "A-10C",
            ["A-10C", "A-10A", "A-10CII"],
            ["a-10c", "a 10c", "a-10c warthog"],
        ),
        UnitInfo::new(
            "a-10cii",
            "A-10C II",
            ["A-10CII", "A-10A", "A-10C"],
            ["a-10cii", "a-10c2", "a-10c ii warthog", "a-10c ii tank killer"],
        ),
        UnitInfo::new(
            "ah-64d",
            "AH-64D",
            ["AH-64D_BLK_II"],
            ["ah-64d", "ah-64", "ah64", "apache"],
        ),
        UnitInfo::new("ajs-37", "AJS-37", ["AJS37"], ["ajs-37", "ajs 37", "viggen"]),
        UnitInfo::new("av-8b", "AV-8B", ["AV8BNA"], ["av-8b", "harrier"]),
        UnitInfo::new(
            "f-14",
            "F-14",
            ["f-14b", "f-14a-135-gr"],
            ["f-14", "f-14a", "f-14b", "tomcat"],
        ),
        UnitInfo::new(
            "f-16c",
            "F-16C Viper",
            ["F-16C_50"],
            ["f-16c", "f-16", "f16", "viper"],
        ),
        UnitInfo::new(
            "fa-18c",
            "F/A-18C Hornet",
            ["FA-18C_hornet"],
            ["fa-18c", "f/a-18c", "f-18", "hornet"],
        ),
        UnitInfo::new("ka-50", "Ka-50", ["ka-50"], ["ka-50", "black shark"]),
        UnitInfo::new("m-2000c", "M-2000C", ["M-2000C"], ["m-2000c", "mirage 2000"]),
        UnitInfo::new(
            "mig-21bis",
            "MiG-21bis",
            ["MiG-21Bis"],
            ["mig-21bis", "mig-21", "fishbed"],
        ),
        UnitInfo::new("uh-1h", "UH-1H", ["uh-1h"], ["uh-1h", "huey"]),
    ]
}
