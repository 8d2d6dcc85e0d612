//! End-to-end parsing of invoice text dumps.

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use taxline_core::{
    LineItemError, LineItemParser, ParseOutput, ParseWarning, TaxInvoiceParser, TaxlineConfig,
};

const TWO_PAGE_INVOICE: &str = "\
JUMAX FOAM PVT LIMITED
GST INVOICE
Invoice No Date: JF/25-26/0412 12/05/2025
SN DESCRIPITION HSN PKG QTY UNIT RATE AMOUNT CGST SGST
TWW 94042190 1 9.00 PCS 720.00
1
6480.00 9.00ADJ HE WP
24 - 22 - 12 9.00
TWW-HPCN1 94042190 1 2.00 PCS 255.00
2
510.00 9.00 CUSHION COVER 9.00
CONTD.ON NEXT PAGE
Original For Buyer
JUMAX FOAM PVT LIMITED
ABC 94042190 1 9.00 PCS 28/02
3
6480.00 9.00 WIDGET
XYZ 94042190 1 X
4
SHORT
TOTAL 13470.00
ZZZ 94042190 1 1.00 PCS 10.00
5
10.00 9.00 AFTER
";

fn parser() -> TaxInvoiceParser {
    TaxInvoiceParser::new()
}

#[test]
fn test_clean_single_item() {
    let text = "ABC 94042190 1 9.00 PCS 720.00\n1\n6480.00 9.00 WIDGET RED 9.00";
    let output = parser().parse(text);

    let records = output.records();
    assert_eq!(records.len(), 1);
    let item = &records[0];
    assert_eq!(item.hsn, "94042190");
    assert_eq!(item.pkg, Decimal::ONE);
    assert_eq!(item.qty, Decimal::new(9, 0));
    assert_eq!(item.unit, "PCS");
    assert_eq!(item.rate, Decimal::new(720, 0));
    assert_eq!(item.amount, Decimal::new(6480, 0));
    assert_eq!(item.cgst, Decimal::new(9, 0));
    assert_eq!(item.sgst, Decimal::new(9, 0));
    assert_eq!(item.description, "ABC WIDGET RED");
}

#[test]
fn test_missing_sgst_defaults_to_cgst() {
    let text = "ABC 94042190 1 1.00 PCS 500.00\n1\n500.00 5.00";
    let output = parser().parse(text);

    let item = &output.records()[0];
    assert_eq!(item.cgst, Decimal::new(500, 2));
    assert_eq!(item.sgst, item.cgst);
    assert_eq!(item.description, "ABC");
}

#[test]
fn test_multi_page_document() {
    let report = parser().parse_report(TWO_PAGE_INVOICE);

    assert_eq!(report.block_count, 4);
    let descriptions: Vec<&str> = report
        .records
        .iter()
        .map(|r| r.description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec!["TWW ADJ HE WP 24-22-12", "TWW CUSHION COVER", "ABC WIDGET"]
    );

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].block_index, 3);
    assert!(matches!(
        report.failures[0].error,
        LineItemError::HeaderParseFailed { .. }
    ));
}

#[test]
fn test_block_count_conservation() {
    let report = parser().parse_report(TWO_PAGE_INVOICE);
    assert_eq!(
        report.success_count() + report.failure_count(),
        report.block_count
    );
}

#[test]
fn test_serial_numbers_follow_blocks() {
    let report = parser().parse_report(TWO_PAGE_INVOICE);
    let serials: Vec<u32> = report.records.iter().map(|r| r.sl_no).collect();

    assert_eq!(serials, vec![1, 2, 3]);
    assert!(serials.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_nothing_after_terminator() {
    let report = parser().parse_report(TWO_PAGE_INVOICE);

    assert!(report.records.iter().all(|r| !r.description.starts_with("ZZZ")));
    assert!(report
        .blocks
        .iter()
        .flatten()
        .all(|line| !line.contains("ZZZ") && !line.contains("AFTER")));
}

#[test]
fn test_amounts_consistent_or_warned() {
    let text = "\
TWW 94042190 1 2.00 PCS 100.00
1
250.00 9.00 MAT
TWW 94042190 1 3.00 PCS 33.33
2
100.00 9.00 PAD";
    let report = parser().parse_report(text);
    let tolerance = Decimal::new(1, 2);

    assert_eq!(report.records.len(), 2);
    for record in &report.records {
        let off = (record.rate * record.qty - record.amount).abs();
        assert!(off <= tolerance || report.has_amount_warning(record.sl_no));
    }
    assert!(report.has_amount_warning(1));
    assert!(!report.has_amount_warning(2));
}

#[test]
fn test_implausible_rate_is_derived() {
    let text = "ABC 94042190 1 9.00 PCS 28/02\n1\n6480.00 9.00 WIDGET";
    let report = parser().parse_report(text);

    assert_eq!(report.records[0].rate, Decimal::new(720, 0));
    assert_eq!(
        report.warnings,
        vec![ParseWarning::RateDerived {
            sl_no: 1,
            raw: "28/02".to_string(),
            derived: Decimal::new(720, 0),
        }]
    );
}

#[test]
fn test_boilerplate_line_truncated() {
    let text = "\
ABC 94042190 1 9.00 PCS 720.00
1
6480.00 9.00 WIDGET RED 9.00
JUMAX FOAM PVT LIMITED A/C 1234567890 IFSC UBIN0512345 BULANDSHAHAR ROAD";
    let output = parser().parse(text);

    assert_eq!(output.records()[0].description, "ABC WIDGET RED");
}

#[test]
fn test_empty_result_is_diagnostic() {
    let output = parser().parse("GST INVOICE\nno items on this page\n");

    match &output {
        ParseOutput::Diagnostic(diag) => {
            assert_eq!(diag.error, "Parsing failed");
            assert_eq!(diag.total_blocks, 0);
            assert!(diag.raw.is_empty());
        }
        ParseOutput::Items(items) => panic!("expected diagnostic, got {} items", items.len()),
    }

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["error"], "Parsing failed");
    assert_eq!(json["totalBlocks"], 0);
}

#[test]
fn test_all_blocks_failed_is_diagnostic() {
    let output = parser().parse("ABC 94042190 1 9.00 PCS 720.00\n1");

    let ParseOutput::Diagnostic(diag) = output else {
        panic!("expected diagnostic");
    };
    assert_eq!(diag.total_blocks, 1);
    assert_eq!(diag.raw, vec![vec![
        "ABC 94042190 1 9.00 PCS 720.00".to_string(),
        "1".to_string(),
    ]]);
}

#[test]
fn test_custom_terminator_from_config() {
    let mut config = TaxlineConfig::default();
    config.markers.terminators.push("END OF ITEMS".to_string());
    let parser = TaxInvoiceParser::from_config(&config).unwrap();

    let text = "\
ABC 94042190 1 1.00 PCS 10.00
1
10.00 9.00 ONE
END OF ITEMS
DEF 94042190 1 1.00 PCS 10.00
2
10.00 9.00 TWO";
    let report = parser.parse_report(text);

    assert_eq!(report.block_count, 1);
    assert_eq!(report.records[0].description, "ABC ONE");
}

#[test]
fn test_records_serialize_with_decimal_strings() {
    let output = parser().parse("ABC 94042190 1 9.00 PCS 720.00\n1\n6480.00 9.00 WIDGET RED 9.00");
    let json = serde_json::to_value(&output).unwrap();

    assert_eq!(json[0]["sl_no"], 1);
    assert_eq!(json[0]["rate"], "720.00");
    assert_eq!(json[0]["description"], "ABC WIDGET RED");
}

#[test]
fn test_parse_from_text_source() {
    let source = taxline_core::PlainText(
        "ABC 94042190 1 9.00 PCS 720.00\n1\n6480.00 9.00 WIDGET RED 9.00".to_string(),
    );
    let output = parser().parse_source(&source).unwrap();

    assert_eq!(output.records().len(), 1);
}
