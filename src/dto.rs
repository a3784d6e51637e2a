use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed set of expense categories. The declaration order is the order in
/// which category totals are reported. Parsing ignores case, both through
/// [`FromStr`] and when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Category {
    Meals = 0,
    Travel = 1,
    Software = 2,
    Other = 3,
}

impl Category {
    pub const COUNT: usize = 4;
    pub const ALL: [Category; Category::COUNT] = [
        Category::Meals,
        Category::Travel,
        Category::Software,
        Category::Other,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Meals => "Meals",
            Category::Travel => "Travel",
            Category::Software => "Software",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Ledger actions accepted in a script.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateUser,
    UpdateUser,
    DeleteUser,
    CreateExpense,
    UpdateExpense,
    DeleteExpense,
}

/// One row of a ledger script. Which optional columns are required depends
/// on the action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptRow {
    pub action: Action,
    /// Script-local label of the user or expense the row creates or targets.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Label of the owning user, for expense rows.
    pub user: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_cost")]
    pub cost: Option<Decimal>,
}

/// Costs are parsed from their textual form so that no precision is lost
/// through an intermediate float.
fn deserialize_cost<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| Decimal::from_str(raw.trim()).map_err(serde::de::Error::custom))
        .transpose()
}

/// Renders an amount with exactly two decimal places.
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

fn serialize_money<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_money(*amount))
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UserRow {
    pub user: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(serialize_with = "serialize_money")]
    pub total: Decimal,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ExpenseRow {
    pub expense: String,
    pub user: String,
    pub user_name: String,
    pub category: Category,
    pub description: String,
    #[serde(serialize_with = "serialize_money")]
    pub cost: Decimal,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryRow {
    pub category: Category,
    #[serde(serialize_with = "serialize_money")]
    pub total: Decimal,
    #[serde(serialize_with = "serialize_money")]
    pub share: Decimal,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SummaryRow {
    #[serde(serialize_with = "serialize_money")]
    pub total_expenses: Decimal,
    pub expense_count: usize,
    #[serde(serialize_with = "serialize_money")]
    pub average_expense: Decimal,
    pub user_count: usize,
    pub top_spender: Option<String>,
    pub top_spender_expense_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse_csv_row(row: &str) -> Result<ScriptRow, csv::Error> {
        let data_with_header = format!(
            "action,ref,user,first_name,last_name,category,description,cost\n{}",
            row
        );
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data_with_header.as_bytes());
        reader.deserialize().next().unwrap()
    }

    #[test]
    fn test_parse_create_user() {
        assert_eq!(
            parse_csv_row("create_user,ann,,Ann,Lee,,,").unwrap(),
            ScriptRow {
                action: Action::CreateUser,
                reference: "ann".into(),
                user: None,
                first_name: Some("Ann".into()),
                last_name: Some("Lee".into()),
                category: None,
                description: None,
                cost: None,
            }
        );
    }

    #[test]
    fn test_parse_create_expense_keeps_cost_scale() {
        let row = parse_csv_row("create_expense,lunch,ann,,,Meals,team lunch,12.50").unwrap();
        assert_eq!(row.action, Action::CreateExpense);
        assert_eq!(row.user.as_deref(), Some("ann"));
        assert_eq!(row.category, Some(Category::Meals));
        assert_eq!(row.description.as_deref(), Some("team lunch"));
        assert_eq!(row.cost, Some(dec!(12.50)));
        assert_eq!(row.cost.unwrap().scale(), 2);
    }

    #[test]
    fn test_parse_delete_expense() {
        let row = parse_csv_row("delete_expense,lunch,,,,,,").unwrap();
        assert_eq!(row.action, Action::DeleteExpense);
        assert_eq!(row.reference, "lunch");
        assert_eq!(row.cost, None);
    }

    #[test]
    fn test_parse_invalid_cost_format() {
        assert!(parse_csv_row("create_expense,x,ann,,,Meals,lunch,abc").is_err());
    }

    #[test]
    fn test_parse_category_ignores_case() {
        let row = parse_csv_row("create_expense,x,ann,,,meals,lunch,1.0").unwrap();
        assert_eq!(row.category, Some(Category::Meals));
        let row = parse_csv_row("create_expense,x,ann,,,SOFTWARE,ide,1.0").unwrap();
        assert_eq!(row.category, Some(Category::Software));
    }

    #[test]
    fn test_parse_invalid_category() {
        assert!(parse_csv_row("create_expense,x,ann,,,Food,lunch,1.0").is_err());
    }

    #[test]
    fn test_parse_invalid_action() {
        assert!(parse_csv_row("rename_user,ann,,Ann,Lee,,,").is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Travel".parse::<Category>(), Ok(Category::Travel));
        assert_eq!("software".parse::<Category>(), Ok(Category::Software));
        assert_eq!(
            "Food".parse::<Category>(),
            Err(UnknownCategory("Food".into()))
        );
    }

    #[test]
    fn test_category_order_is_stable() {
        let indices: Vec<_> = Category::ALL.iter().map(|c| c.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(20)), "20.00");
        assert_eq!(format_money(dec!(12.5)), "12.50");
        assert_eq!(format_money(dec!(3.14159)), "3.14");
        assert_eq!(format_money(dec!(0.005)), "0.01");
        assert_eq!(format_money(dec!(-0.00)), "0.00");
    }
}
