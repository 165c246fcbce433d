// KML templates for the case map
//
// Every interpolated value arrives already escaped by `sanitize`. Popup
// tables live inside CDATA so Google Earth renders them as HTML.

use std::io::{self, Write};

use crate::db::{CallEvent, Case, TowerLocation};
use crate::sanitize::sanitize;

pub const EXTENSION: &str = "kml";

const ICON_HREF: &str = "http://maps.google.com/mapfiles/kml/paddle/ylw-blank.png";

const ROW_STYLE_LABEL: &str = "vertical-align: top; padding-left: 10px; white-space: nowrap;";
const ROW_STYLE_VALUE: &str =
    "vertical-align: top; padding-left: 6px; padding-right: 10px; white-space: nowrap;";

/// Document root, case metadata and the shared point styles
pub fn write_header<W: Write>(w: &mut W, case: &Case) -> io::Result<()> {
    let case_number = sanitize(&case.case_number);
    let agency = sanitize(&case.agency);
    let agent = sanitize(&case.agent);
    let analyst = sanitize(&case.analyst);
    let target = sanitize(&case.target_number);

    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        w,
        r#"<kml xmlns="http://www.opengis.net/kml/2.2" xmlns:gx="http://www.google.com/kml/ext/2.2">"#
    )?;
    writeln!(w, "<Document>")?;
    writeln!(w, "<name>{} ({}) :: {}</name>", case_number, agency, target)?;
    writeln!(w, r#"<Snippet maxLines="1"><![CDATA[ {} ]]></Snippet>"#, case_number)?;
    writeln!(w, "<open>1</open>")?;
    writeln!(
        w,
        "<Style><IconStyle><Icon /></IconStyle>{}</Style>",
        balloon_style()
    )?;
    writeln!(
        w,
        "<description><![CDATA[ {} ({}) location data for target number {}. Prepared for {} by {}. ]]></description>",
        case_number, agency, target, agent, analyst
    )?;
    writeln!(
        w,
        "<StyleMap id=\"Map1\">\
         <Pair><key>normal</key><styleUrl>#NormalMap1</styleUrl></Pair>\
         <Pair><key>highlight</key><styleUrl>#HighlightMap1</styleUrl></Pair>\
         </StyleMap>"
    )?;
    write_point_style(w, "NormalMap1", "1", "2", "00FF00FF")?;
    write_point_style(w, "HighlightMap1", "1.1", "3", "70FF00FF")?;
    Ok(())
}

fn balloon_style() -> &'static str {
    "<BalloonStyle><text><![CDATA[ $[description] ]]></text></BalloonStyle>"
}

fn write_point_style<W: Write>(
    w: &mut W,
    id: &str,
    scale: &str,
    line_width: &str,
    poly_color: &str,
) -> io::Result<()> {
    writeln!(
        w,
        "<Style id=\"{id}\">\
         <IconStyle><scale>{scale}</scale><Icon><href>{href}</href></Icon><color>FF00FFFF</color></IconStyle>\
         <LabelStyle><color>FFFFFFFF</color><scale>{scale}</scale></LabelStyle>\
         <LineStyle><color>FFFF00FF</color><width>{line_width}</width></LineStyle>\
         <PolyStyle><fill>0</fill><outline>1</outline><color>{poly_color}</color></PolyStyle>\
         {balloon}\
         </Style>",
        id = id,
        scale = scale,
        href = ICON_HREF,
        line_width = line_width,
        poly_color = poly_color,
        balloon = balloon_style(),
    )
}

/// One placemark for a call event at its serving tower sector
pub fn write_placemark<W: Write>(
    w: &mut W,
    event: &CallEvent,
    tower: &TowerLocation,
) -> io::Result<()> {
    let longitude = sanitize(&tower.longitude);
    let latitude = sanitize(&tower.latitude);

    writeln!(w, "<Placemark>")?;
    writeln!(w, "<name><![CDATA[ {} ]]></name>", event.id)?;
    writeln!(w, r#"<Snippet maxLines="0" />"#)?;
    writeln!(w, "<styleUrl>#Map1</styleUrl>")?;
    writeln!(w, "<ExtendedData />")?;
    writeln!(
        w,
        "<LookAt><longitude>{}</longitude><latitude>{}</latitude><range>1000</range>\
         <altitudeMode>relativeToGround</altitudeMode><tilt>0</tilt><heading>0</heading></LookAt>",
        longitude, latitude
    )?;
    writeln!(
        w,
        "<Point><altitudeMode>clampToGround</altitudeMode><extrude>0</extrude>\
         <coordinates>{},{},0</coordinates></Point>",
        longitude, latitude
    )?;
    writeln!(w, "<description>{}</description>", description(event, tower))?;
    writeln!(w, "</Placemark>")?;
    Ok(())
}

/// Popup table for a placemark, wrapped in CDATA
fn description(event: &CallEvent, tower: &TowerLocation) -> String {
    let mut rows: Vec<(String, String)> = vec![
        ("Calling Number".to_string(), sanitize(&event.calling_number)),
        ("Called Number".to_string(), sanitize(&event.called_number)),
        ("Dialed Number".to_string(), sanitize(&event.dialed_digits)),
        ("Call Direction".to_string(), sanitize(&event.direction)),
        ("Start Date".to_string(), sanitize(&event.start_date)),
        ("End Date".to_string(), sanitize(&event.end_date)),
        ("Duration".to_string(), sanitize(&event.duration)),
        ("Cell Site".to_string(), sanitize(&event.cell_site_id)),
        ("Sector".to_string(), sanitize(&event.sector)),
        ("Azimuth".to_string(), sanitize(tower.azimuth)),
        ("Latitude".to_string(), sanitize(&tower.latitude)),
        ("Longitude".to_string(), sanitize(&tower.longitude)),
    ];
    rows.extend(event.extra.iter().map(|(k, v)| (sanitize(k), sanitize(v))));

    let mut html = String::from("<![CDATA[ <table border='0' cellspacing='0' cellpadding='0'>");
    html.push_str(&format!(
        "<tr><td colspan='2' style='{}'><b>{}</b></td></tr>",
        ROW_STYLE_VALUE, event.id
    ));
    html.push_str(&format!(
        "<tr><td colspan='2' style='{} max-width: 400px;'>&nbsp;</td></tr>",
        ROW_STYLE_VALUE
    ));

    for (i, (label, value)) in rows.iter().enumerate() {
        // alternate rows are shaded
        let shade = if i % 2 == 0 { " bgcolor='#ddffdd'" } else { "" };
        html.push_str(&format!(
            "<tr{}><td style='{}'><b>{}</b></td><td style='{}'>{}</td></tr>",
            shade, ROW_STYLE_LABEL, label, ROW_STYLE_VALUE, value
        ));
    }

    html.push_str("</table> ]]>");
    html
}

/// Close the document opened by `write_header`
pub fn write_footer<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "</Document>")?;
    writeln!(w, "</kml>")?;
    Ok(())
}
