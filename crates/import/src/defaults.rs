/// Built-in fallback rules, consulted after the user's categories and in
/// this order. Some keywords appear under more than one category; the
/// earlier category wins.
pub const DEFAULT_RULES: &[(&str, &[&str])] = &[
    ("TRAVEL", &["MTA", "PATH", "OMNY"]),
    (
        "Shopping",
        &[
            "FIVE BELO",
            "AMAZON MKTPL",
            "INSTACART",
            "TARGET",
            "PRIMARK",
            "RED APPLE",
            "Amazon.com",
            "99 CENT",
        ],
    ),
    (
        "Food",
        &[
            "2 BROS",
            "UBER *EATS",
            "McDonalds",
            "PAPA JOHNS",
            "BALADY",
            "FRESH PIZZA",
            "HORUS MEDIA",
            "KARIM",
            "99 CENT",
            "GOURMET FRESH",
            "Patel",
            "SUPER FRE",
            "FOOD Brooklyn NY",
            "DOORDASH",
            "DD",
            "SUPERIOR $1 PIZZA",
            "DUNKIN",
            "BIRRIA LES",
            "HALAL MUNCHIES",
            "PATELS",
            "STARBUCKS",
            "PINE APPLE FARM",
            "NUOVO YORK",
            "SHAKE SHACK",
            "SOMETHING GREEK",
            "CENTRAL VALLEY DELI NEW YORK NY",
        ],
    ),
    (
        "Subscription",
        &[
            "AMAZON PRIME",
            "Spectrum Mobile",
            "CLAUDE.AI",
            "OPENAI",
            "APPLE.COM",
            "MINT MOBILE",
            "Spectrum",
        ],
    ),
    ("Groceries", &["FRESH JENNY'S", "WEEE"]),
    (
        "Personal",
        &[
            "Zelle",
            "BUBBLES",
            "NYU",
            "UBER *TRIP",
            "ATM WITHDRAWAL",
            "Microsoft",
            "MICRO ELECTRONIC",
            "BBPBOATHOUSE",
        ],
    ),
    ("Wire Fee", &["WIRE FEE"]),
    ("Internet", &["Spectrum"]),
];
