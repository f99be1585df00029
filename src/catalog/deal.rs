use serde::Deserialize;

/// One property record from the catalog CSV.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Deal {
    #[serde(alias = "id")]
    pub property_id: i64,
    pub deal_type: String,
    pub property_type: String,
    pub city: String,
    pub state: String,
    pub beds: f64,
    pub baths: f64,
    pub sqft: f64,
    pub purchase_price: f64,
    pub arv: f64,
    pub entry_fee: f64,
    pub estimated_monthly_payment: f64,
    pub condition: String,
    pub occupancy: String,
}

/// Spelling of a numeric column that is copied into the deal text verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberSpelling {
    /// `3`, for columns whose every raw field is an integer.
    Integer,
    /// Shortest round-trip float, always with a fractional part (`2.0`, `1850.5`).
    #[default]
    Float,
}

impl NumberSpelling {
    /// `Integer` when every raw field of the column parses as an integer.
    pub fn infer<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        if fields
            .into_iter()
            .all(|field| field.trim().parse::<i64>().is_ok())
        {
            NumberSpelling::Integer
        } else {
            NumberSpelling::Float
        }
    }

    fn render(self, value: f64) -> String {
        match self {
            NumberSpelling::Integer => truncate(value).to_string(),
            NumberSpelling::Float => format!("{value:?}"),
        }
    }
}

/// Per-column spellings for the verbatim numeric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub baths: NumberSpelling,
    pub payment: NumberSpelling,
}

impl Deal {
    /// Renders the fixed-template sentence with float spellings for baths and payment.
    pub fn render_text(&self) -> String {
        self.render_text_with(TextStyle::default())
    }

    /// Renders the fixed-template sentence the models were trained on.
    ///
    /// Counts and money amounts other than the payment are truncated to integers;
    /// baths and payment follow `style`.
    pub fn render_text_with(&self, style: TextStyle) -> String {
        format!(
            "{} {} in {} {}. {} bed {} bath, {} sqft. Purchase {}, ARV {}, Entry {}, Payment {}. Condition {}, Occupancy {}.",
            self.deal_type,
            self.property_type,
            self.city,
            self.state,
            truncate(self.beds),
            style.baths.render(self.baths),
            truncate(self.sqft),
            truncate(self.purchase_price),
            truncate(self.arv),
            truncate(self.entry_fee),
            style.payment.render(self.estimated_monthly_payment),
            self.condition,
            self.occupancy,
        )
    }
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}
