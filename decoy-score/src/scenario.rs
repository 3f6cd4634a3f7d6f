//! Built-in scenario fixtures and weighted sampling.

use decoy_core::{DecoyError, DecoyResult, IntelCategory, Scenario, ScenarioError};
use rand::Rng;
use std::collections::BTreeMap;

/// An immutable set of ground-truth scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// The built-in fixture set covering the deployment's scam archetypes.
    pub fn builtin() -> Self {
        Self::new(vec![
            bank_kyc_fraud(),
            lottery_prize(),
            upi_cashback(),
        ])
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Look up a scenario by id.
    pub fn get(&self, id: &str) -> DecoyResult<&Scenario> {
        self.scenarios
            .iter()
            .find(|scenario| scenario.id == id)
            .ok_or_else(|| {
                DecoyError::Scenario(ScenarioError::UnknownScenario { id: id.to_string() })
            })
    }

    /// Sample a scenario, weighted by each scenario's `weight`.
    /// Scenarios with non-positive weight are never selected.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DecoyResult<&Scenario> {
        let total: f64 = self
            .scenarios
            .iter()
            .map(|scenario| scenario.weight.max(0.0))
            .sum();
        if self.scenarios.is_empty() || total <= 0.0 {
            return Err(DecoyError::Scenario(ScenarioError::EmptySet));
        }

        let mut remaining = rng.random_range(0.0..total);
        for scenario in &self.scenarios {
            let weight = scenario.weight.max(0.0);
            if remaining < weight {
                return Ok(scenario);
            }
            remaining -= weight;
        }

        // Floating point edge: fall back to the last positively weighted one.
        self.scenarios
            .iter()
            .rev()
            .find(|scenario| scenario.weight > 0.0)
            .ok_or_else(|| DecoyError::Scenario(ScenarioError::EmptySet))
    }
}

fn fake_data(entries: &[(IntelCategory, &str)]) -> BTreeMap<IntelCategory, String> {
    entries
        .iter()
        .map(|(category, value)| (*category, value.to_string()))
        .collect()
}

fn bank_kyc_fraud() -> Scenario {
    Scenario {
        id: "bank-kyc-fraud".to_string(),
        name: "Bank KYC Fraud".to_string(),
        description: "Caller poses as a bank officer threatening account \
                      suspension unless KYC is re-verified."
            .to_string(),
        category: "banking".to_string(),
        opening_message: "Dear customer, your account will be suspended in 24 \
                          hours. Verify your KYC immediately."
            .to_string(),
        metadata: None,
        weight: 0.4,
        max_turns: 12,
        fake_data: fake_data(&[
            (IntelCategory::PhoneNumbers, "9876543210"),
            (IntelCategory::BankAccounts, "123456789012"),
            (IntelCategory::Urls, "http://kyc-verify-bank.example/update"),
        ]),
    }
}

fn lottery_prize() -> Scenario {
    Scenario {
        id: "lottery-prize".to_string(),
        name: "Lottery Prize".to_string(),
        description: "Victim has 'won' a lottery and must pay a processing \
                      fee and quote a claim reference to collect."
            .to_string(),
        category: "lottery".to_string(),
        opening_message: "Congratulations! You have won Rs 25,00,000 in the \
                          national lucky draw. Claim your prize now."
            .to_string(),
        metadata: None,
        weight: 0.3,
        max_turns: 10,
        fake_data: fake_data(&[
            (IntelCategory::EmailAddresses, "claims@natlotto-prize.example"),
            (IntelCategory::PhoneNumbers, "14155552671"),
            (IntelCategory::CaseIds, "WIN4587"),
        ]),
    }
}

fn upi_cashback() -> Scenario {
    Scenario {
        id: "upi-cashback".to_string(),
        name: "UPI Cashback Phishing".to_string(),
        description: "A fake cashback offer that routes the victim to a \
                      phishing link and a mule UPI handle."
            .to_string(),
        category: "payments".to_string(),
        opening_message: "You have received a cashback reward of Rs 4,999! \
                          Click here to collect before it expires."
            .to_string(),
        metadata: None,
        weight: 0.3,
        max_turns: 8,
        fake_data: fake_data(&[
            (IntelCategory::UpiIds, "cashback.rewards@ybl"),
            (IntelCategory::Urls, "http://upi-cashback.example/claim"),
        ]),
    }
}
