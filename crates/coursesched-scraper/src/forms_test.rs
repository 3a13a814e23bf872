use super::*;

const TERM_PAGE: &str = r#"<html><body>
<FORM ACTION="/prod_uoit/bwckgens.p_proc_term_date" METHOD="post">
<INPUT TYPE="hidden" NAME="p_calling_proc" VALUE="bwckschd.p_disp_dyn_sched">
<SELECT NAME="p_term" SIZE="1" ID="term_input_id">
<OPTION VALUE="">None
<OPTION VALUE="201809">Fall 2018
<OPTION VALUE="201801" SELECTED>Winter 2018
<OPTION VALUE="201709">Fall 2017 (View only)
</SELECT>
<input type='submit' value='Submit'>
</FORM>
<form action="/search" method="get"><input name="q"></form>
</body></html>"#;

#[test]
fn selected_option_comes_first_then_document_order() {
    let forms = parse_forms(TERM_PAGE);
    let select = &forms[0].inputs[1];
    assert_eq!(select.name, "p_term");
    assert_eq!(select.values, vec!["201801", "", "201809", "201709"]);
}

#[test]
fn select_without_selected_keeps_document_order() {
    let html = r#"<form><select name="s"><option value="a">A<option value="b">B</select></form>"#;
    let forms = parse_forms(html);
    assert_eq!(forms[0].inputs[0].values, vec!["a", "b"]);
}

#[test]
fn extracts_action_and_uppercased_method() {
    let forms = parse_forms(TERM_PAGE);
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].action, "/prod_uoit/bwckgens.p_proc_term_date");
    assert_eq!(forms[0].method, "POST");
    assert_eq!(forms[1].action, "/search");
    assert_eq!(forms[1].method, "GET");
}

#[test]
fn method_defaults_to_get() {
    let forms = parse_forms(r#"<form action="/x"><input name="a" value="1"></form>"#);
    assert_eq!(forms[0].method, "GET");
}

#[test]
fn plain_inputs_take_value_attribute_with_either_quote_style() {
    let forms = parse_forms(TERM_PAGE);
    let hidden = &forms[0].inputs[0];
    assert_eq!(hidden.name, "p_calling_proc");
    assert_eq!(hidden.values, vec!["bwckschd.p_disp_dyn_sched"]);

    let submit = &forms[0].inputs[2];
    assert_eq!(submit.name, "");
    assert_eq!(submit.values, vec!["Submit"]);
}

#[test]
fn input_without_value_has_no_candidates() {
    let forms = parse_forms(TERM_PAGE);
    assert_eq!(forms[1].inputs[0].name, "q");
    assert!(forms[1].inputs[0].values.is_empty());
}

#[test]
fn unclosed_select_yields_empty_values_and_parsing_continues() {
    let html = r#"<form><select name="broken"><option value="x">X<input name="after" value="ok"></form>"#;
    let forms = parse_forms(html);
    let inputs = &forms[0].inputs;
    assert_eq!(inputs[0].name, "broken");
    assert!(inputs[0].values.is_empty());
    assert_eq!(inputs[1].name, "after");
    assert_eq!(inputs[1].values, vec!["ok"]);
}

#[test]
fn textarea_uses_value_attribute_and_skips_its_body() {
    let html = r#"<form><textarea name="t" value="v"><input name="inside"></textarea></form>"#;
    let forms = parse_forms(html);
    assert_eq!(forms[0].inputs.len(), 1);
    assert_eq!(forms[0].inputs[0].values, vec!["v"]);
}

#[test]
fn option_without_value_attribute_is_skipped() {
    let html = r#"<form><select name="s"><option>Pick<option value="1">One</select></form>"#;
    let forms = parse_forms(html);
    assert_eq!(forms[0].inputs[0].values, vec!["1"]);
}

#[test]
fn no_forms_yields_empty() {
    assert!(parse_forms("<html>Error: connection refused</html>").is_empty());
    assert!(parse_forms("").is_empty());
}
