//! `pl_mortgage` is a Rust library for calculating and ranking mortgage offers of Polish banks.
//!
//! Given the loan a customer asks for and a catalog of bank offers, it computes
//! every offer and ranks them:
//! - **Amortization**: equal (annuity) or decreasing installments.
//! - **Cost of credit**: effective rate including WIBOR, margin and LTV
//!   surcharges, commission, insurance, account fees and the RRSO.
//! - **Scoring**: a 0-100 composite of monthly payment, total cost and RRSO,
//!   normalized across the offers being compared.
//! - **Risk**: debt-to-income tiers and rate-shock scenarios for variable offers.
//! - **Comparison**: rank and deviation from the average offer.
//!
//! Everything is pure and synchronous; the catalog is passed in explicitly.
//!
//! ## Usage
//!
//! ```rust
//! use pl_mortgage::{BankCatalog, CalculatorConfig, LoanParameters, calculate_offers};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let catalog = BankCatalog::from_json_str(r#"{
//!         "banks": [{
//!             "id": "pko",
//!             "name": "PKO BP",
//!             "baseInterestRate": 7.45,
//!             "wibor": 5.85,
//!             "margin": 1.6,
//!             "commissionRate": 0,
//!             "minLoanAmount": 100000,
//!             "maxLoanAmount": 2500000,
//!             "minLoanPeriod": 5,
//!             "maxLoanPeriod": 35,
//!             "minDownPaymentPercent": 10,
//!             "supportedPurposes": ["purchase"],
//!             "supportedInterestRateTypes": ["variable"]
//!         }]
//!     }"#).expect("valid catalog");
//!
//!     let params = LoanParameters::new(dec!(400000), 25, dec!(15000))
//!         .with_down_payment(dec!(100000));
//!     let config = CalculatorConfig::default();
//!
//!     match calculate_offers(&params, &catalog, &config) {
//!         Ok(comparison) => {
//!             for offer in &comparison.results {
//!                 println!("{}: {:.2} per month, RRSO {}%, score {}",
//!                     offer.bank_name, offer.monthly_payment, offer.rrso, offer.score);
//!             }
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating offers: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod amortization;
pub mod bank;
pub mod config;
pub mod costs;
pub mod debounce;
pub mod eligibility;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod result;
pub mod risk;
pub mod scoring;

pub use amortization::{AmortizationResult, MonthPayment, Schedule};
pub use bank::{Affiliate, BankCatalog, BankOffer, InsuranceMode, LtvAdjustments};
pub use config::{
    AffordabilityThresholds, CalculatorConfig, ParameterBounds, RrsoMethod, ScoringWeights,
};
pub use costs::CostBreakdown;
pub use debounce::{DebouncedCalculator, Debouncer};
pub use eligibility::Ineligibility;
pub use error::{CalculatorError, CalculatorResult, CatalogError, ConfigError};
pub use params::{InstallmentType, InterestRateType, LoanParameters, LoanPurpose};
pub use pipeline::{
    ExcludedOffer, ExclusionReason, OfferAnalysis, OfferComparison, calculate_offer,
    calculate_offers,
};
pub use report::{Comparison, SetSummary};
pub use result::CalculationResult;
pub use risk::{Affordability, AffordabilityLevel, RiskScenario};
