//! Markup extraction for the auto.mail.ru catalog
//!
//! This module turns fetched documents into the crawler's work items and
//! records:
//! - the last-page control on the first search page
//! - model links on catalog pages
//! - modification links on model pages
//! - one [`CarRecord`] per detail page
//!
//! The site's markup is matched by exact `class` attribute value. Extraction
//! never fails a record: anything missing degrades to an empty field or
//! table, and all node access is bounds-checked.

use crate::crawler::fetcher::Document;
use crate::record::{CarRecord, SpecTable};
use scraper::{ElementRef, Html, Selector};

const LAST_PAGE_LINK: &str = r#"a[class="paging__link paging__link_last js-paging__page"]"#;

const CATALOG_ITEM: &str = r#"div[class="p-search__item js-module link-hdr"]"#;
const MODEL_LINK: &str = r#"a[class="hdr__text"]"#;

const MODIFICATION_ITEM: &str = r#"span[class="cell padding_10 padding_bottom_5"]"#;
const MODIFICATION_LINK: &str = r#"a[class="text text_bold_medium"]"#;

const BREADCRUMB_TEXT: &str = r#"span[class="link__text"]"#;
const DETAIL_HEADER: &str = r#"h1[class="hdr hdr_bold_huge hdr_color_white hdr_collapse"]"#;
const HEADER_YEARS: &str = r#"span[class="hdr__ending color_gray"]"#;
const PRICE_TEXT: &str = r#"span[class="text text_slab_medium margin_right_10"]"#;

const SPECS_BLOCK: &str = r#"div[class="js-specs-content js-specs-content_active"]"#;
const MODIFICATION_NAME: &str = r#"span[class="text text_bold_medium"]"#;
const DESCRIPTION_BLOCK: &str = r#"div[class="padding_bottom_10"]"#;
const SPEC_CELL: &str = r#"div[class="cols__inner"]"#;
const SPEC_ROW_CLASS: &str = "cols cols_percent";

/// Site-specific markup extraction consumed by the pipeline
///
/// Implementations are synchronous: a document's body is parsed inside the
/// call, so fetch futures holding only [`Document`] values stay `Send`.
/// Link methods return raw hrefs exactly as the markup carries them,
/// possibly blank; the pipeline decides what a blank link means.
pub trait CatalogExtractor: Send + Sync {
    /// Reads the "last page" paging control, if present and numeric
    fn last_page(&self, doc: &Document) -> Option<u32>;

    /// Collects one href per model entry on a catalog page
    fn model_links(&self, doc: &Document) -> Vec<String>;

    /// Collects one href per modification entry on a model page
    fn modification_links(&self, doc: &Document) -> Vec<String>;

    /// Builds a fully-defaulted record from a detail page
    fn record(&self, doc: &Document) -> CarRecord;
}

/// [`CatalogExtractor`] for the auto.mail.ru markup
#[derive(Debug, Default, Clone, Copy)]
pub struct MailRuExtractor;

impl CatalogExtractor for MailRuExtractor {
    fn last_page(&self, doc: &Document) -> Option<u32> {
        let html = Html::parse_document(&doc.body);
        let selector = Selector::parse(LAST_PAGE_LINK).ok()?;
        let control = html.select(&selector).next()?;
        element_text(control).parse().ok()
    }

    fn model_links(&self, doc: &Document) -> Vec<String> {
        collect_item_links(&doc.body, CATALOG_ITEM, MODEL_LINK)
    }

    fn modification_links(&self, doc: &Document) -> Vec<String> {
        collect_item_links(&doc.body, MODIFICATION_ITEM, MODIFICATION_LINK)
    }

    fn record(&self, doc: &Document) -> CarRecord {
        let html = Html::parse_document(&doc.body);
        let mut record = CarRecord::default();

        if let Ok(selector) = Selector::parse(BREADCRUMB_TEXT) {
            // Breadcrumbs run catalog → brand → model
            let crumbs: Vec<ElementRef> = html.select(&selector).collect();
            record.brand = crumbs.get(1).copied().map(element_text).unwrap_or_default();
            record.model = crumbs.get(2).copied().map(element_text).unwrap_or_default();
        }

        if let (Ok(header_selector), Ok(years_selector)) =
            (Selector::parse(DETAIL_HEADER), Selector::parse(HEADER_YEARS))
        {
            if let Some(years) = html
                .select(&header_selector)
                .next()
                .and_then(|header| header.select(&years_selector).next())
            {
                // The site renders the year range with an en dash
                record.production_years = element_text(years).replace('\u{2013}', "-");
            }
        }

        if let Ok(selector) = Selector::parse(PRICE_TEXT) {
            if let Some(price) = html.select(&selector).next() {
                record.price = element_text(price).replace('\u{a0}', " ");
            }
        }

        if let Ok(selector) = Selector::parse(SPECS_BLOCK) {
            let blocks: Vec<ElementRef> = html.select(&selector).collect();

            if let Some(summary) = blocks.first() {
                if let Ok(name_selector) = Selector::parse(MODIFICATION_NAME) {
                    if let Some(name) = summary.select(&name_selector).next() {
                        record.modification = element_text(name);
                    }
                }

                if let Ok(description_selector) = Selector::parse(DESCRIPTION_BLOCK) {
                    if let Some(description) = summary.select(&description_selector).next() {
                        record.description = element_text(description).replace('\u{a0}', " ");
                    }
                }
            }

            if let Some(specs) = blocks.get(1) {
                fold_spec_entries(scan_spec_entries(*specs), &mut record);
            }
        }

        record
    }
}

/// The eight recognized specification sections of a detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecSection {
    Engine,
    Dynamics,
    Transmission,
    Chassis,
    Body,
    Steering,
    Dimensions,
    Other,
}

impl SpecSection {
    /// Matches a section header by its exact text
    fn from_header(text: &str) -> Option<Self> {
        match text {
            "Двигатель" => Some(Self::Engine),
            "Динамические характеристики" => Some(Self::Dynamics),
            "Трансмиссия" => Some(Self::Transmission),
            "Ходовая часть" => Some(Self::Chassis),
            "Кузов" => Some(Self::Body),
            "Рулевое управление" => Some(Self::Steering),
            "Размеры, масса, объемы" => Some(Self::Dimensions),
            "Прочее" => Some(Self::Other),
            _ => None,
        }
    }

    fn table<'a>(&self, record: &'a mut CarRecord) -> &'a mut SpecTable {
        match self {
            Self::Engine => &mut record.engine,
            Self::Dynamics => &mut record.dynamics,
            Self::Transmission => &mut record.transmission,
            Self::Chassis => &mut record.chassis,
            Self::Body => &mut record.body,
            Self::Steering => &mut record.steering,
            Self::Dimensions => &mut record.dimensions,
            Self::Other => &mut record.other,
        }
    }
}

/// One element child of the specs block, classified
enum SpecEntry {
    /// A recognized section header; switches the active table
    Header(SpecSection),
    /// A label/value row belonging to the active section
    Pair(String, String),
    /// Anything else; closes the active section
    Boundary,
}

/// Scans the specs block's element children into an ordered entry sequence
///
/// The block is walked exactly once. A row with the spec-row class and two
/// label/value cells becomes a [`SpecEntry::Pair`]; a malformed row (wrong
/// cell count) is dropped without closing the section.
fn scan_spec_entries(block: ElementRef<'_>) -> Vec<SpecEntry> {
    let Ok(cell_selector) = Selector::parse(SPEC_CELL) else {
        return Vec::new();
    };

    block
        .children()
        .filter_map(ElementRef::wrap)
        .filter_map(|child| {
            if child.value().attr("class") == Some(SPEC_ROW_CLASS) {
                let cells: Vec<ElementRef> = child.select(&cell_selector).collect();
                if cells.len() == 2 {
                    Some(SpecEntry::Pair(
                        element_text(cells[0]),
                        element_text(cells[1]),
                    ))
                } else {
                    None
                }
            } else if let Some(section) = SpecSection::from_header(&element_text(child)) {
                Some(SpecEntry::Header(section))
            } else {
                Some(SpecEntry::Boundary)
            }
        })
        .collect()
}

/// Folds the entry sequence into the record's eight spec tables
fn fold_spec_entries(entries: Vec<SpecEntry>, record: &mut CarRecord) {
    let mut current: Option<SpecSection> = None;

    for entry in entries {
        match entry {
            SpecEntry::Header(section) => current = Some(section),
            SpecEntry::Pair(label, value) => {
                if let Some(section) = current {
                    section.table(record).insert(label, value);
                }
            }
            SpecEntry::Boundary => current = None,
        }
    }
}

/// Collects one href per container item, empty when the item has no link
fn collect_item_links(body: &str, item_selector: &str, link_selector: &str) -> Vec<String> {
    let html = Html::parse_document(body);

    let (Ok(items), Ok(links)) = (
        Selector::parse(item_selector),
        Selector::parse(link_selector),
    ) else {
        return Vec::new();
    };

    html.select(&items)
        .map(|item| {
            item.select(&links)
                .next()
                .and_then(|link| link.value().attr("href"))
                .unwrap_or("")
                .to_string()
        })
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Document {
        Document {
            url: "https://auto.mail.ru/test".to_string(),
            body: body.to_string(),
        }
    }

    fn detail_page() -> Document {
        doc(r#"<html><body>
            <span class="link__text">Каталог</span>
            <span class="link__text">BMW</span>
            <span class="link__text">3 серии</span>
            <h1 class="hdr hdr_bold_huge hdr_color_white hdr_collapse">
                BMW 3 серии
                <span class="hdr__ending color_gray">2015&ndash;2018</span>
            </h1>
            <span class="text text_slab_medium margin_right_10">1&nbsp;234&nbsp;567 ₽</span>
            <div class="js-specs-content js-specs-content_active">
                <span class="text text_bold_medium">320i AT</span>
                <div class="padding_bottom_10">Седан четвертого&nbsp;поколения</div>
            </div>
            <div class="js-specs-content js-specs-content_active">
                <div>Двигатель</div>
                <div class="cols cols_percent">
                    <div class="cols__inner">Мощность</div>
                    <div class="cols__inner">184 л.с.</div>
                </div>
                <div class="cols cols_percent">
                    <div class="cols__inner">Рабочий объем</div>
                    <div class="cols__inner">1998 см³</div>
                </div>
                <div>Трансмиссия</div>
                <div class="cols cols_percent">
                    <div class="cols__inner">Коробка передач</div>
                    <div class="cols__inner">автомат</div>
                </div>
            </div>
        </body></html>"#)
    }

    #[test]
    fn test_last_page_control() {
        let extractor = MailRuExtractor;
        let page = doc(
            r#"<html><body>
            <a class="paging__link js-paging__page" href="?page=2">2</a>
            <a class="paging__link paging__link_last js-paging__page" href="?page=7">7</a>
            </body></html>"#,
        );

        assert_eq!(extractor.last_page(&page), Some(7));
    }

    #[test]
    fn test_last_page_absent() {
        let extractor = MailRuExtractor;
        assert_eq!(extractor.last_page(&doc("<html><body></body></html>")), None);
    }

    #[test]
    fn test_last_page_non_numeric() {
        let extractor = MailRuExtractor;
        let page = doc(
            r#"<html><body>
            <a class="paging__link paging__link_last js-paging__page">next</a>
            </body></html>"#,
        );

        assert_eq!(extractor.last_page(&page), None);
    }

    #[test]
    fn test_model_links() {
        let extractor = MailRuExtractor;
        let page = doc(
            r#"<html><body>
            <div class="p-search__item js-module link-hdr">
                <a class="hdr__text" href="/catalog/bmw/3er/">BMW 3</a>
            </div>
            <div class="p-search__item js-module link-hdr">
                <a class="hdr__text" href="/catalog/audi/a4/">Audi A4</a>
            </div>
            </body></html>"#,
        );

        assert_eq!(
            extractor.model_links(&page),
            vec!["/catalog/bmw/3er/", "/catalog/audi/a4/"]
        );
    }

    #[test]
    fn test_model_item_without_link_yields_blank() {
        let extractor = MailRuExtractor;
        let page = doc(
            r#"<html><body>
            <div class="p-search__item js-module link-hdr">no anchor here</div>
            </body></html>"#,
        );

        assert_eq!(extractor.model_links(&page), vec![""]);
    }

    #[test]
    fn test_modification_links() {
        let extractor = MailRuExtractor;
        let page = doc(
            r#"<html><body>
            <span class="cell padding_10 padding_bottom_5">
                <a class="text text_bold_medium" href="/catalog/bmw/3er/sedan/101/">320i</a>
            </span>
            <span class="cell padding_10 padding_bottom_5">
                <a class="text text_bold_medium" href="/catalog/bmw/3er/sedan/102/">330d</a>
            </span>
            </body></html>"#,
        );

        assert_eq!(
            extractor.modification_links(&page),
            vec!["/catalog/bmw/3er/sedan/101/", "/catalog/bmw/3er/sedan/102/"]
        );
    }

    #[test]
    fn test_record_from_full_detail_page() {
        let extractor = MailRuExtractor;
        let record = extractor.record(&detail_page());

        assert_eq!(record.brand, "BMW");
        assert_eq!(record.model, "3 серии");
        assert_eq!(record.production_years, "2015-2018");
        assert_eq!(record.price, "1 234 567 ₽");
        assert_eq!(record.modification, "320i AT");
        assert_eq!(record.description, "Седан четвертого поколения");

        assert_eq!(record.engine.len(), 2);
        assert_eq!(record.engine.get("Мощность").map(String::as_str), Some("184 л.с."));
        assert_eq!(
            record.engine.get("Рабочий объем").map(String::as_str),
            Some("1998 см³")
        );

        assert_eq!(record.transmission.len(), 1);
        assert_eq!(
            record.transmission.get("Коробка передач").map(String::as_str),
            Some("автомат")
        );

        assert!(record.dynamics.is_empty());
        assert!(record.chassis.is_empty());
        assert!(record.body.is_empty());
        assert!(record.steering.is_empty());
        assert!(record.dimensions.is_empty());
        assert!(record.other.is_empty());
    }

    #[test]
    fn test_record_from_empty_page_is_fully_defaulted() {
        let extractor = MailRuExtractor;
        let record = extractor.record(&doc("<html><body></body></html>"));

        assert_eq!(record, CarRecord::default());
    }

    #[test]
    fn test_record_extraction_is_idempotent() {
        let extractor = MailRuExtractor;
        let page = detail_page();

        assert_eq!(extractor.record(&page), extractor.record(&page));
    }

    #[test]
    fn test_too_few_breadcrumbs_leave_brand_and_model_empty() {
        let extractor = MailRuExtractor;
        let record = extractor.record(&doc(
            r#"<html><body><span class="link__text">Каталог</span></body></html>"#,
        ));

        assert_eq!(record.brand, "");
        assert_eq!(record.model, "");
    }

    #[test]
    fn test_spec_rows_before_any_header_are_dropped() {
        let extractor = MailRuExtractor;
        let record = extractor.record(&doc(
            r#"<html><body>
            <div class="js-specs-content js-specs-content_active"></div>
            <div class="js-specs-content js-specs-content_active">
                <div class="cols cols_percent">
                    <div class="cols__inner">Мощность</div>
                    <div class="cols__inner">184 л.с.</div>
                </div>
                <div>Двигатель</div>
                <div class="cols cols_percent">
                    <div class="cols__inner">Рабочий объем</div>
                    <div class="cols__inner">1998 см³</div>
                </div>
            </div>
            </body></html>"#,
        ));

        assert_eq!(record.engine.len(), 1);
        assert!(record.engine.contains_key("Рабочий объем"));
    }

    #[test]
    fn test_unrecognized_element_closes_the_active_section() {
        let extractor = MailRuExtractor;
        let record = extractor.record(&doc(
            r#"<html><body>
            <div class="js-specs-content js-specs-content_active"></div>
            <div class="js-specs-content js-specs-content_active">
                <div>Кузов</div>
                <div class="cols cols_percent">
                    <div class="cols__inner">Тип кузова</div>
                    <div class="cols__inner">седан</div>
                </div>
                <div class="banner">advertisement</div>
                <div class="cols cols_percent">
                    <div class="cols__inner">Клиренс</div>
                    <div class="cols__inner">140 мм</div>
                </div>
            </div>
            </body></html>"#,
        ));

        assert_eq!(record.body.len(), 1);
        assert!(record.body.contains_key("Тип кузова"));
        assert!(!record.body.contains_key("Клиренс"));
    }

    #[test]
    fn test_malformed_spec_row_keeps_section_open() {
        let extractor = MailRuExtractor;
        let record = extractor.record(&doc(
            r#"<html><body>
            <div class="js-specs-content js-specs-content_active"></div>
            <div class="js-specs-content js-specs-content_active">
                <div>Прочее</div>
                <div class="cols cols_percent">
                    <div class="cols__inner">lonely cell</div>
                </div>
                <div class="cols cols_percent">
                    <div class="cols__inner">Гарантия</div>
                    <div class="cols__inner">3 года</div>
                </div>
            </div>
            </body></html>"#,
        ));

        assert_eq!(record.other.len(), 1);
        assert!(record.other.contains_key("Гарантия"));
    }
}
