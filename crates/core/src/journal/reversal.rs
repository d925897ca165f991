//! Reversal entry construction.
//!
//! A reversal negates the original entry line by line: sides flip, amounts
//! and captured exchange rates carry over unchanged so the net functional
//! effect is exactly zero. The original and the reversal link
//! bidirectionally through `reversed_entry_id`/`reversing_entry_id`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::JournalError;
use super::types::{
    CreateEntryInput, EntryType, JournalLineInput, ResolvedLine, SourceModule,
};

/// Input for building a reversal.
#[derive(Debug, Clone)]
pub struct ReversalInput {
    /// The posted entry being reversed.
    pub original_entry_id: Uuid,
    /// The company of the original entry.
    pub company_id: Uuid,
    /// The original entry's resolved lines.
    pub original_lines: Vec<ResolvedLine>,
    /// The date the reversal posts on; must fall in an Open period.
    pub reversal_date: NaiveDate,
    /// Description of the original entry, echoed in the reversal.
    pub original_description: String,
    /// The user reversing the entry.
    pub reversed_by: Uuid,
}

/// Stateless service building reversal entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the reversing entry input for a posted entry.
    ///
    /// # Errors
    ///
    /// Returns `Unbalanced` if the original lines do not balance in
    /// functional currency (posted entries always should; this guards
    /// against corrupted input).
    pub fn build_reversal(input: &ReversalInput) -> Result<CreateEntryInput, JournalError> {
        let debit: Decimal = input.original_lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = input.original_lines.iter().map(|l| l.credit).sum();
        if debit != credit {
            let currency = input
                .original_lines
                .first()
                .map_or_else(String::new, |l| l.functional_currency.clone());
            return Err(JournalError::Unbalanced {
                total_debits: debit,
                total_credits: credit,
                currency,
            });
        }

        let lines = input
            .original_lines
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                side: line.side.flipped(),
                amount: line.amount,
                currency: line.currency.clone(),
                // Carry the captured rate so the reversal nets to zero even
                // if the rate store has moved on.
                exchange_rate: Some(line.exchange_rate),
                memo: Some(format!(
                    "Reversal: {}",
                    line.memo.clone().unwrap_or_default()
                )),
                dimensions: line.dimensions.clone(),
                intercompany_partner_id: line.intercompany_partner_id,
                matching_line_id: line.matching_line_id,
            })
            .collect();

        Ok(CreateEntryInput {
            company_id: input.company_id,
            entry_type: EntryType::Reversing,
            source_module: SourceModule::System,
            transaction_date: input.reversal_date,
            document_date: None,
            posting_date: None,
            description: format!("Reversal of {}", input.original_description),
            reference: None,
            lines,
            created_by: input.reversed_by,
        })
    }
}
