//! Integration tests for `CampusClient` against wiremock upstreams.

use coursesched_core::{Campus, MarkerProfile, ScheduleType};
use coursesched_scraper::{CampusClient, Fetcher, ProgramQuery, SectionQuery};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_RESULTS: &str = include_str!("fixtures/section_search.html");

const TERM_PAGE: &str = r#"<html><body>
<form action="/prod_uoit/bwckgens.p_proc_term_date" method="post">
<input type="hidden" name="p_calling_proc" value="bwckschd.p_disp_dyn_sched">
<select name="p_term" size="1" id="term_input_id">
<option value="">None</option>
<option value="201809">Fall 2018</option>
<option value="201801" selected>Winter 2018</option>
<option value="201709">Fall 2017 (View only)</option>
</select>
</form>
</body></html>"#;

const CATALOG_ROOT: &str = r#"<html><body><ul>
<li><a href="/index.php?catoid=22">Home</a></li>
<li><a href="/content.php?catoid=22&amp;navoid=879">Programs (by Degree)</a></li>
</ul></body></html>"#;

const PROGRAM_LISTING: &str = r#"<td class="block_content">
<p><strong>Bachelor of Applied Science (Honours)</strong></p>
<ul>
<li><a href="preview_program.php?catoid=22&amp;poid=101">Automotive Engineering</a></li>
<li><a href="preview_program.php?catoid=22&amp;poid=104">Software Engineering</a></li>
</ul>
<p><strong>Co-operative Education</strong></p>
</td>"#;

const PROGRAM_DETAIL: &str = r#"<div class="acalog-core">
<h3><a name="year1"></a>Year 1</h3>
<p>Semester 1</p><ul><li>CSCI 1030U Introduction to Computer Science</li>
<li>MATH 1010U Calculus I</li></ul><p>Semester 2</p><ul><li>Elective&#160;&#8211; breadth</li></ul>
<h3><a name="year2"></a>Year 2</h3>
<p>Semester 3</p><ul><li>AUTE 2010U Vehicle Dynamics</li><li>or</li><li>MECE 2430U Dynamics</li></ul>
</div>"#;

fn test_client(base_url: &str) -> CampusClient {
    let fetcher = Fetcher::with_base_url(base_url, 5, "coursesched-test")
        .expect("client construction should not fail");
    CampusClient::new(
        fetcher,
        MarkerProfile::default(),
        "ssbp.mycampus.ca",
        "catalog.uoit.ca",
    )
}

#[tokio::test]
async fn get_terms_fetches_once_and_serves_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prod_uoit/bwckschd.p_disp_dyn_sched"))
        .and(query_param("TRM", "U"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TERM_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let first = client.get_terms().await;
    let second = client.get_terms().await;

    assert_eq!(first, vec!["201801", "201809", "201709"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_term_page_is_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prod_uoit/bwckschd.p_disp_dyn_sched"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.get_terms().await.is_empty());
    assert!(client.get_terms().await.is_empty());
}

#[tokio::test]
async fn refresh_refetches_terms() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prod_uoit/bwckschd.p_disp_dyn_sched"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TERM_PAGE))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let cached = client.get_terms().await;
    let refreshed = client.terms().refresh().await;
    assert_eq!(cached, refreshed);
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG_ROOT))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/content.php"))
        .and(query_param("catoid", "22"))
        .and(query_param("navoid", "879"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROGRAM_LISTING))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/preview_program.php"))
        .and(query_param("poid", "104"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROGRAM_DETAIL))
        .mount(server)
        .await;
}

#[tokio::test]
async fn get_programs_lists_then_details_from_cache() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let client = test_client(&server.uri());

    let listing = client.get_programs(ProgramQuery::listing()).await;
    assert_eq!(listing, "Automotive Engineering\nSoftware Engineering\n");

    let detail = client.get_programs(ProgramQuery::from_query("?1")).await;
    assert_eq!(
        detail,
        "<th>Year 1</th>\n\
         Semester 1\n\
         CSCI 1030U Introduction to Computer Science\n\
         MATH 1010U Calculus I\n\
         Semester 2\n\
         Elective - breadth\n\
         <th>Year 2</th>\n\
         Semester 3\n\
         AUTE 2010U Vehicle Dynamics\n\
         or\n\
         MECE 2430U Dynamics\n"
    );
}

#[tokio::test]
async fn refresh_refetches_programs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATALOG_ROOT))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/content.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROGRAM_LISTING))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let cached = client.programs().list_programs().await;
    assert_eq!(cached.len(), 2);

    let refreshed = client.programs().refresh().await;
    assert_eq!(cached, refreshed);
}

#[tokio::test]
async fn out_of_range_program_index_falls_back_to_listing() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let client = test_client(&server.uri());
    let response = client.get_programs(ProgramQuery::detail(9)).await;
    assert_eq!(response, "Automotive Engineering\nSoftware Engineering\n");
}

#[tokio::test]
async fn get_sections_posts_form_and_parses_blocks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prod_uoit/bwckschd.p_get_crse_unsec"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("TRM=U&term_in=201801&"))
        .and(body_string_contains("&sel_subj=CSCI&sel_crse=1060U&"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_RESULTS))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    // Stray characters are stripped before the form is built.
    let query = SectionQuery::new("2018-01", "CSCI ", "1060U;");
    let sections = client.get_sections(&query).await;

    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0].crn, 40123);
    assert_eq!(sections[0].term, "201801");
    assert_eq!(sections[0].campus, Campus::NorthOshawa);
    assert_eq!(sections[0].times.len(), 2);
    assert_eq!(sections[1].schedule_type, ScheduleType::Lab);
    assert_eq!(sections[2].title, "Unavailable");
}

#[tokio::test]
async fn search_reports_placeholder_mismatches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prod_uoit/bwckschd.p_get_crse_unsec"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_RESULTS))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let parse = client
        .sections()
        .search(&SectionQuery::new("201801", "CSCI", "1060U"))
        .await;
    assert_eq!(parse.sections.len(), 3);
    assert_eq!(parse.mismatches.len(), 1);
}

#[tokio::test]
async fn empty_search_response_yields_no_sections() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prod_uoit/bwckschd.p_get_crse_unsec"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><span class=\"warningtext\">No classes were found that meet your search criteria</span></html>",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let sections = client
        .get_sections(&SectionQuery::new("201801", "XXXX", "0000U"))
        .await;
    assert!(sections.is_empty());
}
