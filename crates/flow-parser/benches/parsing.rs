use criterion::{Criterion, criterion_group, criterion_main};
use flow_core::model::SourceFile;
use flow_parser::{JavaTreeExtractor, MetadataProducer, RegexExtractor, parse_sources};
use std::hint::black_box;
use std::path::PathBuf;

const SAMPLE_JAVA: &str = r#"
package com.example.billing;

import com.example.model.Invoice;
import com.example.model.Customer;
import com.example.repo.*;
import java.util.List;

/** Builds and sends invoices. */
public class InvoiceService extends BaseService implements Auditable {
    private final InvoiceRepository invoices;
    private final Mailer mailer = new Mailer();

    public InvoiceService(InvoiceRepository invoices) {
        this.invoices = invoices;
    }

    public Invoice create(Customer customer, List<LineItem> items) {
        Invoice invoice = new Invoice(customer.getId());
        for (LineItem item : items) {
            invoice.add(item.price(), item.quantity());
        }
        invoices.save(invoice);
        Audit.record("invoice created");
        return invoice;
    }

    public void send(Invoice invoice) {
        try {
            mailer.deliver(invoice.getCustomer().getEmail(), invoice.render());
        } catch (MailException e) {
            e.printStackTrace();
            Retry.later(invoice);
        }
    }

    static class LineItem {
        long price() { return 0; }
        int quantity() { return 1; }
    }
}
"#;

fn bench_tree_extraction(c: &mut Criterion) {
    let path = PathBuf::from("InvoiceService.java");
    let extractor = JavaTreeExtractor::new().unwrap();
    c.bench_function("extract_metadata_tree_sitter", |b| {
        b.iter(|| extractor.extract(black_box(&path), black_box(SAMPLE_JAVA)))
    });
}

fn bench_regex_extraction(c: &mut Criterion) {
    let path = PathBuf::from("InvoiceService.java");
    c.bench_function("extract_metadata_regex", |b| {
        b.iter(|| RegexExtractor.extract(black_box(&path), black_box(SAMPLE_JAVA)))
    });
}

fn bench_parallel_parsing(c: &mut Criterion) {
    let files: Vec<SourceFile> = (0..50)
        .map(|i| SourceFile::new(format!("src/File{}.java", i), SAMPLE_JAVA))
        .collect();
    let extractor = JavaTreeExtractor::new().unwrap();

    c.bench_function("parse_sources_parallel_50", |b| {
        b.iter(|| parse_sources(black_box(&files), &extractor, true))
    });
}

criterion_group!(
    benches,
    bench_tree_extraction,
    bench_regex_extraction,
    bench_parallel_parsing,
);
criterion_main!(benches);
