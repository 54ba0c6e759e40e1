use comfy_table::{Cell, Table};
use spendsort::commands::{CategoryTotalOutput, RuleOutput, SummaryOutput, TransactionOutput};

pub fn summary(summary: &SummaryOutput) {
    println!("Total Income:   {}", summary.total_income);
    println!("Total Expenses: {}", summary.total_expenses);
    println!("Net Balance:    {}", summary.net_balance);
    println!();
    println!("{}", totals_table(&summary.categories));
}

pub fn transactions(rows: &[TransactionOutput]) {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Details", "Description", "Amount", "Category"]);
    for row in rows {
        let category = if row.overridden {
            format!("{} *", row.category)
        } else {
            row.category.clone()
        };
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(&row.posting_date),
            Cell::new(&row.details),
            Cell::new(&row.description),
            Cell::new(&row.amount),
            Cell::new(category),
        ]);
    }
    println!("{table}");
}

pub fn rules(rules: &[RuleOutput]) {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Keywords"]);
    for rule in rules {
        table.add_row(vec![Cell::new(&rule.category), Cell::new(rule.keywords.join(", "))]);
    }
    println!("{table}");
}

fn totals_table(totals: &[CategoryTotalOutput]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Count", "Total"]);
    for t in totals {
        table.add_row(vec![Cell::new(&t.category), Cell::new(t.count), Cell::new(&t.total)]);
    }
    table
}
