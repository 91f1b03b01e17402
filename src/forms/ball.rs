//! Bowling-ball form

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{is_blank, FieldErrors, Validate};
use crate::core::identity::EntityId;
use crate::entities::ball::{BallStatus, BowlingBall};

/// Lightest ball the shop sells or drills, in pounds
pub const MIN_BALL_WEIGHT: u8 = 6;

/// Heaviest regulation ball, in pounds
pub const MAX_BALL_WEIGHT: u8 = 16;

/// Current values of the ball form
///
/// Numeric fields hold the text as typed so that bad input can be reported
/// rather than rejected at parse time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallDraft {
    pub customer_id: Option<EntityId>,
    pub brand: String,
    pub model: String,
    pub weight: String,
    pub serial_number: Option<String>,
    pub purchase_price: String,
    pub purchase_date: Option<NaiveDate>,
    pub drill_sheet_id: Option<EntityId>,
    pub status: Option<BallStatus>,
}

impl BallDraft {
    /// Draft holding a stored ball's values
    pub fn from_ball(ball: &BowlingBall) -> Self {
        Self {
            customer_id: ball.customer_id.clone(),
            brand: ball.brand.clone(),
            model: ball.model.clone(),
            weight: ball.weight.to_string(),
            serial_number: ball.serial_number.clone(),
            purchase_price: ball.purchase_price.map(|p| p.to_string()).unwrap_or_default(),
            purchase_date: ball.purchase_date,
            drill_sheet_id: ball.drill_sheet_id.clone(),
            status: Some(ball.status),
        }
    }

    fn parsed_weight(&self) -> Option<u8> {
        self.weight
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|w| (MIN_BALL_WEIGHT..=MAX_BALL_WEIGHT).contains(w))
    }

    fn parsed_price(&self) -> Result<Option<f64>, ()> {
        let text = self.purchase_price.trim().trim_start_matches('$');
        if text.is_empty() {
            return Ok(None);
        }
        match text.parse::<f64>() {
            Ok(price) if price.is_finite() => Ok(Some(price)),
            _ => Err(()),
        }
    }

    /// Validate, then build the ball
    pub fn into_ball(self, author: String, pro_shop_id: String) -> Result<BowlingBall, FieldErrors> {
        self.validate().into_result()?;

        // validate() rejects any weight that does not parse into range
        let Some(weight) = self.parsed_weight() else {
            let mut errors = FieldErrors::new();
            errors.insert("weight", "Weight is required");
            return Err(errors);
        };
        let purchase_price = self.parsed_price().ok().flatten();

        let mut ball = BowlingBall::new(
            self.brand.trim().to_string(),
            self.model.trim().to_string(),
            weight,
            author,
        );
        ball.customer_id = self.customer_id;
        ball.serial_number = self.serial_number.filter(|s| !is_blank(s));
        ball.purchase_price = purchase_price;
        ball.purchase_date = self.purchase_date;
        ball.drill_sheet_id = self.drill_sheet_id;
        ball.status = self.status.unwrap_or_default();
        ball.pro_shop_id = pro_shop_id;
        Ok(ball)
    }
}

impl Validate for BallDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if is_blank(&self.brand) {
            errors.insert("brand", "Brand is required");
        }
        if is_blank(&self.model) {
            errors.insert("model", "Model is required");
        }

        if is_blank(&self.weight) {
            errors.insert("weight", "Weight is required");
        } else if self.parsed_weight().is_none() {
            errors.insert(
                "weight",
                format!(
                    "Weight must be a whole number between {} and {} lbs",
                    MIN_BALL_WEIGHT, MAX_BALL_WEIGHT
                ),
            );
        }

        if self.parsed_price().is_err() {
            errors.insert("purchase_price", "Purchase price must be a valid number");
        }

        errors
    }
}
