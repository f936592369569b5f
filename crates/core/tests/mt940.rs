//! End-to-end tests for MT940 parsing: the reference customer statement,
//! decode failures, and the skip-validation / lax / streaming behaviors.

use swift_mt_core::record::{CreditDebit, FundsCode};
use swift_mt_core::{
    parse_all_mt940, parse_mt940, validate_mt940, CancellationToken, ParseConfig, MT940,
};

/// The reference customer statement: three statement lines, six `:86:`
/// account-owner entries, opening and closing balances.
const STATEMENT: &str = "{1:F01BPHKPLPKXXXX0000000000}{2:I940BOFAUS6BXBAMN}{4:
:20:TELEWIZORY S.A.
:25:BPHKPLPK/320000546101
:28C:00084/001
:60F:C031002PLN40000,00
:61:0310201020C20000,00FMSCNONREF//8327000090031789
Card transaction
:86: 020?00Wyplata-(dysp/przel)?2008106000760000777777777777?2115617?
22INFO INFO INFO INFO INFO INFO 1 END?23INFO INFO INFO INFO INFO
INFO 2 END?24ZAPLATA ZA FABRYKATY DO TUB?25 - 200 S ZTUK, TRANZY
STORY-?26300 SZT GR544 I OPORNIKI-5?2700 SZT GTX847 FAKTURA 333/
2?28003.?3010600076?310000777777777777?32HUTA SZKLA TOPIC UL
PRZEMY?33SLOWA 67 32-669 WROCLAW?38PL081060007600007777777
77777
:86:ADDITIONAL INFO ONE
:61:0310201020D10000,00FTRFREF 25611247//8327000090031790
Transfer
:86: 020?00Wyplata-(dysp/przel)?2008106000760000777777777777?2115617?
22INFO INFO INFO INFO INFO INFO 1 END?23INFO INFO INFO INFO INFO
INFO 2 END?24ZAPLATA ZA FABRYKATY DO TUB?25 - 200 S ZTUK, TRANZY
STORY-?26300 SZT GR544 I OPORNIKI-5?2700 SZT GTX847 FAKTURA 333/
2?28003.?3010600076?310000777777777777?38PL081060007600007777777
77777
:86:ADDITIONAL INFO TWO
:61:0310201020C40,00FTRFNONREF//8327000090031791
Interest credit
:86: 844?00Uznanie kwot\u{105} odsetek?20Odsetki od lokaty nr 101000?21022086
:86:ADDITIONAL INFO THREE
:62F:C020325PLN50040,00
-}";

/// A compact all-ASCII statement whose every field also passes pattern
/// validation.
const CLEAN_STATEMENT: &str = "{1:F01BPHKPLPKXXXX0000000000}{2:I940BOFAUS6BXBAMN}{4:
:20:TELEWIZORY S.A.
:25:BPHKPLPK/320000546101
:28C:00084/001
:60F:C031002PLN40000,00
:61:0310201020C20000,00FMSCNONREF//8327000090031789
Card transaction
:86:CARD PAYMENT REFERENCE 8327000090031789
:62F:C020325PLN50040,00
-}";

// ─── End-to-end decoding ─────────────────────────────────────────────────────

#[test]
fn reference_statement_decodes_completely() {
    let config = ParseConfig::new().skip_validation(true);
    let (messages, errors) = parse_all_mt940(STATEMENT.as_bytes(), config);
    assert!(errors.is_none(), "unexpected errors: {errors:?}");
    assert_eq!(messages.len(), 1);

    let statement = &messages[0];
    assert_eq!(statement.base.basic_header.logical_terminal_address, "BPHKPLPKXXXX");
    assert!(statement.base.is_input());
    assert_eq!(statement.base.message_type(), "940");
    assert_eq!(statement.reference, "TELEWIZORY S.A.");
    assert_eq!(statement.account_identification, "BPHKPLPK/320000546101");
    assert_eq!(statement.statement_number_sequence_number, "00084/001");

    let balance = &statement.opening_balance;
    assert_eq!(balance.credit_debit, CreditDebit::Credit);
    assert_eq!(balance.date.raw, "031002");
    assert_eq!(balance.currency, "PLN");
    assert_eq!(balance.amount, 40000.00);

    let lines = &statement.statement_lines;
    assert_eq!(lines.len(), 3);
    let amounts: Vec<f64> = lines.iter().map(|l| l.amount).collect();
    assert_eq!(amounts, vec![20000.00, 10000.00, 40.00]);
    let funds: Vec<FundsCode> = lines.iter().map(|l| l.funds_code).collect();
    assert_eq!(
        funds,
        vec![FundsCode::Credit, FundsCode::Debit, FundsCode::Credit]
    );
    assert_eq!(lines[0].description, "Card transaction");
    assert_eq!(lines[1].description, "Transfer");
    assert_eq!(lines[1].account_owner_reference, "REF 25611247");
    assert_eq!(lines[1].bank_reference, "//8327000090031790");
    assert_eq!(lines[2].description, "Interest credit");

    let info = &statement.account_owner_information;
    assert_eq!(info.len(), 6);
    assert!(info[0].starts_with("020?00Wyplata-(dysp/przel)"));
    assert_eq!(info[1], "ADDITIONAL INFO ONE");
    assert_eq!(info[3], "ADDITIONAL INFO TWO");
    assert!(info[4].starts_with("844?00Uznanie"));
    assert_eq!(info[5], "ADDITIONAL INFO THREE");

    // The closing balance is not part of the typed record but stays in the
    // generic body.
    assert_eq!(statement.base.raw, "{1:F01BPHKPLPKXXXX0000000000}{2:I940BOFAUS6BXBAMN}{4:-}");
}

#[test]
fn clean_statement_passes_validation() {
    let (messages, errors) = parse_all_mt940(CLEAN_STATEMENT.as_bytes(), ParseConfig::new());
    assert!(errors.is_none(), "unexpected errors: {errors:?}");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].statement_lines.len(), 1);
    assert_eq!(messages[0].account_owner_information.len(), 1);
}

#[test]
fn statement_repetition_order_is_wire_order() {
    let config = ParseConfig::new().skip_validation(true);
    let (messages, _) = parse_all_mt940(STATEMENT.as_bytes(), config);
    let dates: Vec<&str> = messages[0]
        .statement_lines
        .iter()
        .map(|l| l.raw.split('\n').next().unwrap_or(""))
        .collect();
    assert_eq!(
        dates,
        vec![
            "0310201020C20000,00FMSCNONREF//8327000090031789",
            "0310201020D10000,00FTRFREF 25611247//8327000090031790",
            "0310201020C40,00FTRFNONREF//8327000090031791",
        ]
    );
}

// ─── Validation behavior ─────────────────────────────────────────────────────

#[test]
fn out_of_repertoire_characters_fail_validation_and_discard() {
    let (messages, errors) = parse_all_mt940(STATEMENT.as_bytes(), ParseConfig::new());
    assert!(messages.is_empty(), "invalid message should be discarded");
    let errors = errors.expect("validation errors expected");
    let rendered = errors.to_string();
    assert!(rendered.contains("validation failed for MT940 message"));
    assert!(rendered.contains("AccountOwnerInformation"));
}

#[test]
fn lax_yields_the_message_and_still_reports() {
    let config = ParseConfig::new().lax(true);
    let (messages, errors) = parse_all_mt940(STATEMENT.as_bytes(), config);
    assert_eq!(messages.len(), 1, "lax keeps the invalid message");
    assert!(errors.is_some(), "lax still reports the errors");
    assert_eq!(messages[0].statement_lines.len(), 3);
}

#[test]
fn skip_validation_still_fills_the_record() {
    let config = ParseConfig::new().skip_validation(true);
    let (messages, errors) = parse_all_mt940(STATEMENT.as_bytes(), config);
    assert!(errors.is_none());
    // Structural decoding ran: raw and set fields are populated.
    assert!(messages[0].opening_balance.set);
    assert_eq!(messages[0].opening_balance.raw, "C031002PLN40000,00");
    assert!(messages[0].statement_lines.iter().all(|l| l.set));
}

#[test]
fn validating_an_empty_record_reports_mandatory_fields() {
    let error = validate_mt940(&MT940::default()).expect_err("empty record is invalid");
    let rendered = error.to_string();
    assert!(rendered.contains("empty mandatory field Reference"));
    assert!(rendered.contains("AccountIdentification"));
    // The mandatory dive reports its nested mandatory fields.
    assert!(rendered.contains("OpeningBalance|60F|"));
    assert!(rendered.contains("empty mandatory field Date"));
}

// ─── Decode failure paths ────────────────────────────────────────────────────

#[test]
fn invalid_credit_debit_indicator_reports_and_discards() {
    let input = CLEAN_STATEMENT.replace(":60F:C031002PLN40000,00", ":60F:E031002PLN40000,00");
    let (messages, errors) = parse_all_mt940(input.as_bytes(), ParseConfig::new());
    assert!(messages.is_empty());
    let errors = errors.expect("decode error expected");
    let rendered = errors.to_string();
    assert!(rendered.contains("could not decode MT940 message"));
    assert!(rendered.contains("decoding failed for tag 60F, field OpeningBalance"));
    assert!(rendered.contains("credit/debit: invalid indicator: E"));
}

#[test]
fn invalid_funds_code_reports_and_discards() {
    let input = CLEAN_STATEMENT.replace(
        ":61:0310201020C20000,00FMSC",
        ":61:0310201020A20000,00FMSC",
    );
    let (messages, errors) = parse_all_mt940(input.as_bytes(), ParseConfig::new());
    assert!(messages.is_empty());
    let rendered = errors.expect("decode error expected").to_string();
    assert!(rendered.contains("statement line: invalid or missing funds code"));
}

#[test]
fn wrong_message_type_is_rejected() {
    let input = CLEAN_STATEMENT.replace("{2:I940", "{2:I950");
    let (messages, errors) = parse_all_mt940(input.as_bytes(), ParseConfig::new());
    assert!(messages.is_empty());
    let rendered = errors.expect("type mismatch expected").to_string();
    assert!(rendered.contains("expected message type 940, got 950"));
}

// ─── Streaming entry ─────────────────────────────────────────────────────────

#[test]
fn streaming_matches_batch() {
    let config = ParseConfig::new().skip_validation(true);
    let (message_rx, error_rx) =
        parse_mt940(STATEMENT.as_bytes(), config, CancellationToken::new());
    let streamed: Vec<MT940> = message_rx.iter().collect();
    let errors: Vec<_> = error_rx.iter().collect();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    let (batch, _) = parse_all_mt940(STATEMENT.as_bytes(), config);
    assert_eq!(streamed, batch);
}

#[test]
fn streaming_reports_errors_in_order() {
    let mut input = String::new();
    // An invalid statement followed by a valid one.
    input.push_str(&CLEAN_STATEMENT.replace(":60F:C031002PLN40000,00", ":60F:E031002PLN40000,00"));
    input.push('\n');
    input.push_str(CLEAN_STATEMENT);
    let input = input.into_bytes();

    let (message_rx, error_rx) =
        parse_mt940(std::io::Cursor::new(input), ParseConfig::new(), CancellationToken::new());
    let messages: Vec<MT940> = message_rx.iter().collect();
    let errors: Vec<_> = error_rx.iter().collect();

    assert_eq!(messages.len(), 1);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line(), 1);
    assert_eq!(messages[0].base.line, 11, "second statement starts on line 11");
}
