use spendsort::commands::{self, FilterInput, OverrideInput};
use spendsort::Session;
use spendsort_core::{CategoryLabel, Money, Polarity, RuleSource, TransactionId};
use spendsort_import::{CategorizationEngine, EngineOptions, LabelCase, LoadOptions, MatchFields};
use spendsort_storage::RuleStore;

const STATEMENT: &str = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
DEBIT,05/01/2024,AMAZON MKTPL 123,-42.10,DEBIT_CARD,1957.90,
DEBIT,05/01/2024,Zelle payment to Landlord JPM99,-725.00,QUICKPAY_DEBIT,1232.90,
DEBIT,05/02/2024,Zelle payment to Landlord JPM99,-700.00,QUICKPAY_DEBIT,532.90,
DEBIT,05/03/2024,UNKNOWN MERCHANT XYZ,-10.00,DEBIT_CARD,522.90,
DEBIT,05/04/2024,DUNKIN #3391 Q35,-5.50,DEBIT_CARD,517.40,
CREDIT,05/05/2024,ACME CORP PAYROLL,2000.00,ACH_CREDIT,2517.40,
";

fn open_session(dir: &tempfile::TempDir, options: EngineOptions) -> Session {
    let store = RuleStore::open(dir.path().join("categories.json")).unwrap();
    Session::new(store, CategorizationEngine::new(options))
}

fn load(session: &mut Session) {
    session
        .load_csv(STATEMENT.as_bytes(), &LoadOptions::default())
        .unwrap();
}

#[test]
fn user_rule_labels_amazon_as_shopping() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir, EngineOptions::default());
    session.add_category("Shopping").unwrap();
    session.add_keyword("Shopping", "amazon").unwrap();
    load(&mut session);

    let tx = &session.transactions()[0];
    assert_eq!(
        tx.category,
        CategoryLabel::Matched {
            category: "Shopping".to_string(),
            source: RuleSource::User
        }
    );
    assert_eq!(session.transactions()[3].category.to_string(), "Uncategorized");
}

#[test]
fn rent_filter_selects_only_the_expected_amount() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(
        &dir,
        EngineOptions {
            fields: MatchFields::DescriptionAndType,
            default_fallback: false,
            label_case: LabelCase::Upper,
        },
    );
    session.add_category("Rent").unwrap();
    session.add_keyword("Rent", "landlord").unwrap();
    load(&mut session);

    let rows = commands::filter_transactions(
        &session,
        &FilterInput {
            category: "RENT".to_string(),
            amount: Some("-725".to_string()),
        },
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].amount, "-$725.00");
}

#[test]
fn type_column_can_drive_matching() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(
        &dir,
        EngineOptions {
            fields: MatchFields::DescriptionAndType,
            default_fallback: false,
            label_case: LabelCase::AsDefined,
        },
    );
    session.add_category("Income").unwrap();
    session.add_keyword("Income", "ach_credit").unwrap();
    load(&mut session);
    assert_eq!(session.transactions()[5].category.name(), Some("Income"));
}

#[test]
fn override_survives_rule_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir, EngineOptions::default());
    load(&mut session);
    assert_eq!(session.transactions()[4].category.name(), Some("Food"));

    commands::set_override(
        &mut session,
        &OverrideInput {
            transaction_id: 4,
            category: "Custom".to_string(),
        },
    )
    .unwrap();

    session.add_category("Coffee").unwrap();
    session.add_keyword("Coffee", "dunkin").unwrap();
    session.recategorize().unwrap();
    assert_eq!(
        session.transactions()[4].category,
        CategoryLabel::Overridden("Custom".to_string())
    );
}

#[test]
fn reloading_the_statement_clears_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir, EngineOptions::default());
    load(&mut session);
    session.override_category(TransactionId(4), "Custom").unwrap();
    load(&mut session);
    assert_eq!(session.transactions()[4].category.name(), Some("Food"));
}

#[test]
fn rules_persist_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = open_session(&dir, EngineOptions::default());
        session.add_category("Shopping").unwrap();
        session.add_keyword("Shopping", "amazon").unwrap();
        assert!(!session.add_keyword("Shopping", "amazon").unwrap());
    }
    let session = open_session(&dir, EngineOptions::default());
    let rules = commands::get_rules(&session);
    let shopping = rules.iter().find(|r| r.category == "Shopping").unwrap();
    assert_eq!(shopping.keywords, ["amazon"]);
}

#[test]
fn summary_totals_debits_and_credits() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir, EngineOptions::default());
    load(&mut session);

    let debit_sum: Money = session
        .by_polarity(Polarity::Debit)
        .iter()
        .map(|tx| tx.amount)
        .sum();
    assert_eq!(debit_sum, Money::from_cents(-148260));

    let out = commands::get_summary(&session, Some(Polarity::Debit));
    assert_eq!(out.total_income, "$2000.00");
    assert_eq!(out.total_expenses, "$1482.60");
    assert_eq!(out.net_balance, "$517.40");
    let names: Vec<&str> = out.categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, ["Shopping", "Personal", "Food", "Uncategorized"]);
}

#[test]
fn bad_statement_reports_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&dir, EngineOptions::default());
    let path = dir.path().join("statement.csv");
    std::fs::write(&path, "Details,Posting Date,Description,Amount\nDEBIT,5/1/24x,X,-1\n").unwrap();
    let err = commands::load_statement(&mut session, &path, &LoadOptions::default()).unwrap_err();
    assert!(err.message.contains("invalid date"));
    assert!(session.transactions().is_empty());
}
