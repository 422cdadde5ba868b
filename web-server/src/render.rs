//! Server-rendered HTML pages
//!
//! Plain strings, no template engine. Every text shown comes from the core's
//! static labels or from numbers, so nothing user-supplied is echoed back.

use std::fmt::Write;

use empleo_core::constants::{AGE_MAX, AGE_MIN, APP_NAME, EDUCATION_MAX, EDUCATION_MIN};
use empleo_core::logic::features::{Gender, YesNo};
use empleo_core::logic::report::Direction;
use empleo_core::{RawResponse, Report};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 56rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { font-size: 1.6rem; }
form .row { display: flex; justify-content: space-between; align-items: center; margin: .5rem 0; }
table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
th, td { border-bottom: 1px solid #ddd; padding: .4rem; text-align: left; }
.probability { font-size: 2.4rem; font-weight: bold; }
.bar { height: 1rem; display: inline-block; }
.increases { background: #2e7d32; }
.decreases { background: #c62828; }
.error { color: #c62828; }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

pub fn intro_page() -> String {
    let body = format!(
        r#"<h1>{APP_NAME}</h1>
<p>Esta herramienta estima la probabilidad de que una persona esté empleada a partir
de ocho características sociodemográficas, usando un modelo de clasificación entrenado
previamente.</p>
<p>Además de la probabilidad, se muestra cuánto contribuye cada característica al
resultado y en qué dirección.</p>
<form method="post" action="/intro/dismiss">
<button type="submit">Comenzar</button>
</form>"#
    );
    page(APP_NAME, &body)
}

fn yes_no_select(name: &str, label: &str, current: YesNo) -> String {
    let mut options = String::new();
    for value in YesNo::ALL {
        let selected = if value == current { " selected" } else { "" };
        let _ = write!(options, "<option value=\"{0}\"{1}>{0}</option>", value.label(), selected);
    }
    format!("<div class=\"row\"><label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\">{options}</select></div>\n")
}

fn gender_select(current: Gender) -> String {
    let mut options = String::new();
    for value in Gender::ALL {
        let selected = if value == current { " selected" } else { "" };
        let _ = write!(options, "<option value=\"{0}\"{1}>{0}</option>", value.label(), selected);
    }
    format!("<div class=\"row\"><label for=\"gender\">Género</label><select id=\"gender\" name=\"gender\">{options}</select></div>\n")
}

fn number_input(name: &str, label: &str, value: u8, min: u8, max: u8) -> String {
    format!(
        "<div class=\"row\"><label for=\"{name}\">{label}</label>\
         <input type=\"number\" id=\"{name}\" name=\"{name}\" value=\"{value}\" min=\"{min}\" max=\"{max}\" required></div>\n"
    )
}

fn form_fields(response: &RawResponse) -> String {
    let mut fields = String::new();
    fields.push_str(&yes_no_select("head_of_household", "¿Es jefe(a) de hogar?", response.head_of_household));
    fields.push_str(&gender_select(response.gender));
    fields.push_str(&yes_no_select("rural", "¿Vive en zona rural?", response.rural));
    fields.push_str(&number_input(
        "education_years",
        "Años de educación acumulada",
        response.education_years.get(),
        EDUCATION_MIN,
        EDUCATION_MAX,
    ));
    fields.push_str(&number_input("age", "Edad", response.age.get(), AGE_MIN, AGE_MAX));
    fields.push_str(&yes_no_select("indigenous_language", "¿Habla una lengua indígena?", response.indigenous_language));
    fields.push_str(&yes_no_select("married", "¿Está casado(a)?", response.married));
    fields.push_str(&yes_no_select("indigenous_identity", "¿Se identifica como indígena?", response.indigenous_identity));
    fields
}

pub fn form_page(response: &RawResponse) -> String {
    let body = format!(
        "<h1>{APP_NAME}</h1>\n<p>Ingrese sus datos a continuación para calcular la probabilidad de que usted tenga empleo \
         y descubra qué factores influyen más en su situación laboral.</p>\n<form method=\"post\" action=\"/predict\">\n{}<button type=\"submit\">Calcular probabilidad de empleo</button>\n</form>",
        form_fields(response)
    );
    page(APP_NAME, &body)
}

fn direction_class(direction: Direction) -> &'static str {
    match direction {
        Direction::Increases => "increases",
        Direction::Decreases => "decreases",
    }
}

/// Table and bar chart, both from the ranked rows
fn report_section(report: &Report) -> String {
    let mut table = String::from(
        "<h2>Factores que más influyen en su predicción</h2>\n<table>\n<thead><tr><th>Variable</th><th>Valor</th><th>Contribución</th><th>% del total</th><th>Interpretación</th></tr></thead>\n<tbody>\n",
    );
    for row in &report.rows {
        let _ = writeln!(
            table,
            "<tr><td>{}</td><td>{}</td><td>{:+.4}</td><td>{:.2}%</td><td>{}</td></tr>",
            row.label, row.display_value, row.attribution, row.share_pct, row.sentence
        );
    }
    table.push_str("</tbody>\n</table>\n");

    let scale = report.max_share();
    let mut chart = String::from("<h2>Visualización de la influencia de cada factor</h2>\n<table>\n");
    for row in &report.rows {
        let width = if scale > 0.0 { row.share_pct / scale * 100.0 } else { 0.0 };
        let _ = writeln!(
            chart,
            "<tr><td>{}</td><td><span class=\"bar {}\" style=\"width: {:.1}%\"></span> {:.2}%</td></tr>",
            row.label,
            direction_class(row.direction),
            width,
            row.share_pct
        );
    }
    chart.push_str("</table>\n");

    table + &chart
}

pub fn result_page(response: &RawResponse, report: &Report) -> String {
    let body = format!(
        "<h1>{APP_NAME}</h1>\n<h2>Su probabilidad de tener empleo es:</h2>\n\
         <p class=\"probability\">{}</p>\n\
         <p>Valor base del modelo: {:.2}%</p>\n{}\n\
         <h2>Modificar respuestas</h2>\n<form method=\"post\" action=\"/predict\">\n{}<button type=\"submit\">Calcular probabilidad de empleo</button>\n</form>",
        report.probability_text,
        f64::from(report.expected_value) * 100.0,
        report_section(report),
        form_fields(response)
    );
    page(APP_NAME, &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>{APP_NAME}</h1>\n<p class=\"error\">{message}</p>\n<p><a href=\"/form\">Volver al formulario</a></p>"
    );
    page(APP_NAME, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use empleo_core::logic::report::AttributionRow;

    fn report() -> Report {
        Report {
            probability: 0.62,
            probability_text: "62.00%".to_string(),
            expected_value: 0.5,
            total_magnitude: 0.2,
            rows: vec![AttributionRow {
                index: 3,
                feature: "ESCOACUM".to_string(),
                label: "Años de educación acumulada".to_string(),
                value: 12.0,
                display_value: "12".to_string(),
                attribution: 0.2,
                magnitude: 0.2,
                share_pct: 100.0,
                direction: Direction::Increases,
                sentence: "Años de educación acumulada = 12 aumenta la probabilidad de estar empleado(a)".to_string(),
            }],
        }
    }

    #[test]
    fn test_form_preselects_current_answers() {
        let html = form_page(&RawResponse::default());
        assert!(html.contains("<option value=\"Mujer\" selected>"));
        assert!(html.contains("name=\"education_years\" value=\"12\""));
        assert!(html.contains("name=\"age\" value=\"30\""));
    }

    #[test]
    fn test_result_page_shows_probability_and_rows() {
        let html = result_page(&RawResponse::default(), &report());
        assert!(html.contains("62.00%"));
        assert!(html.contains("Años de educación acumulada"));
        assert!(html.contains("bar increases"));
        assert!(html.contains("width: 100.0%"));
    }
}
