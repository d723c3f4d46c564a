//! Built-in namespace prefixes.
//!
//! Order matters: when several names share a URI, the first one listed is
//! the canonical name and the others are aliases.

pub(crate) const BUILTIN_PREFIXES: &[(&str, &str)] = &[
    ("akt", "http://www.aktors.org/ontology/portal#"),
    ("akts", "http://www.aktors.org/ontology/support#"),
    ("bd", "http://www.bigdata.com/rdf#"),
    ("bds", "http://www.bigdata.com/rdf/search#"),
    ("bibo", "http://purl.org/ontology/bibo/"),
    ("bio", "http://vocab.org/bio/0.1/"),
    ("bnf_onto", "http://data.bnf.fr/ontology/bnf-onto/"),
    ("bnfroles", "http://data.bnf.fr/vocabulary/roles/"),
    ("category", "http://dbpedia.org/resource/Category:"),
    ("category_fr", "http://fr.dbpedia.org/resource/Catégorie:"),
    ("dawgt", "http://www.w3.org/2001/sw/DataAccess/tests/test-dawg#"),
    ("dbc", "http://dbpedia.org/resource/Category:"),
    ("dbo", "http://dbpedia.org/ontology/"),
    ("dbp", "http://dbpedia.org/property/"),
    ("dbpedia", "http://dbpedia.org/resource/"),
    ("dbpedia_cs", "http://cs.dbpedia.org/resource/"),
    ("dbpedia_de", "http://de.dbpedia.org/resource/"),
    ("dbpedia_el", "http://el.dbpedia.org/resource/"),
    ("dbpedia_es", "http://es.dbpedia.org/resource/"),
    ("dbpedia_fr", "http://fr.dbpedia.org/resource/"),
    ("dbpedia_it", "http://it.dbpedia.org/resource/"),
    ("dbpedia_ja", "http://ja.dbpedia.org/resource/"),
    ("dbpedia_ko", "http://ko.dbpedia.org/resource/"),
    ("dbpedia_nl", "http://nl.dbpedia.org/resource/"),
    ("dbpedia_owl", "http://dbpedia.org/ontology/"),
    ("dbpedia_pl", "http://pl.dbpedia.org/resource/"),
    ("dbpedia_pt", "http://pt.dbpedia.org/resource/"),
    ("dbpedia_ru", "http://ru.dbpedia.org/resource/"),
    ("dbpprop", "http://dbpedia.org/property/"),
    ("dbr", "http://dbpedia.org/resource/"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcmi_box", "http://dublincore.org/documents/dcmi-box/"),
    ("dcmitype", "http://purl.org/dc/dcmitype/"),
    ("dct", "http://purl.org/dc/terms/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("dul", "http://www.ontologydesignpatterns.org/ont/dul/DUL.owl#"),
    ("fabio", "http://purl.org/spar/fabio/"),
    ("fn", "http://www.w3.org/2005/xpath-functions/#"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("frbr_rda", "http://rdvocab.info/uri/schema/FRBRentitiesRDA/"),
    ("freebase", "http://rdf.freebase.com/ns/"),
    ("gas", "http://www.bigdata.com/rdf/gas#"),
    ("genremus", "http://data.bnf.fr/vocabulary/musical-genre/"),
    ("geo", "http://www.w3.org/2003/01/geo/wgs84_pos#"),
    ("geonames", "http://www.geonames.org/ontology#"),
    ("georss", "http://www.georss.org/georss/"),
    ("go", "http://purl.org/obo/owl/GO#"),
    ("hint", "http://www.bigdata.com/queryHints#"),
    ("id", "http://wordnet.rkbexplorer.com/id/"),
    ("ign", "http://data.ign.fr/ontology/topo.owl#"),
    ("insee", "http://rdf.insee.fr/geo/"),
    ("isni", "http://isni.org/ontology#"),
    ("ldp", "http://www.w3.org/ns/ldp#"),
    ("marcrel", "http://id.loc.gov/vocabulary/relators/"),
    ("math", "http://www.w3.org/2000/10/swap/math#"),
    ("mesh", "http://purl.org/commons/record/mesh/"),
    ("mf", "http://www.w3.org/2001/sw/DataAccess/tests/test-manifest#"),
    ("mo", "http://musicontology.com/"),
    ("nci", "http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl#"),
    ("obo", "http://www.geneontology.org/formats/oboInOwl#"),
    ("ogc", "http://www.opengis.net/"),
    ("ogcgml", "http://www.opengis.net/ont/gml#"),
    ("ogcgs", "http://www.opengis.net/ont/geosparql#"),
    ("ogcgsf", "http://www.opengis.net/def/function/geosparql/"),
    ("ogcgsr", "http://www.opengis.net/def/rule/geosparql/"),
    ("ogcsf", "http://www.opengis.net/ont/sf#"),
    ("opencyc", "http://sw.opencyc.org/2008/06/10/concept/"),
    ("ore", "http://www.openarchives.org/ore/terms/"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("p", "http://www.wikidata.org/prop/"),
    ("pq", "http://www.wikidata.org/prop/qualifier/"),
    ("pqn", "http://www.wikidata.org/prop/qualifier/value-normalized/"),
    ("pqv", "http://www.wikidata.org/prop/qualifier/value/"),
    ("pr", "http://www.wikidata.org/prop/reference/"),
    ("prn", "http://www.wikidata.org/prop/reference/value-normalized/"),
    ("product", "http://www.buy.com/rss/module/productV2/"),
    ("prop_fr", "http://fr.dbpedia.org/property/"),
    ("protseq", "http://purl.org/science/protein/bysequence/"),
    ("prov", "http://www.w3.org/ns/prov#"),
    ("prv", "http://www.wikidata.org/prop/reference/value/"),
    ("ps", "http://www.wikidata.org/prop/statement/"),
    ("psn", "http://www.wikidata.org/prop/statement/value-normalized/"),
    ("psv", "http://www.wikidata.org/prop/statement/value/"),
    ("rdagroup1elements", "http://rdvocab.info/Elements/"),
    ("rdagroup2elements", "http://rdvocab.info/ElementsGr2/"),
    ("rdarelationships", "http://rdvocab.info/RDARelationshipsWEMI/"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfa", "http://www.w3.org/ns/rdfa#"),
    ("rdfdf", "http://www.openlinksw.com/virtrdf-data-formats#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("sc", "http://purl.org/science/owl/sciencecommons/"),
    ("schema", "http://schema.org/"),
    ("schemaorg", "http://schema.org/"),
    ("scovo", "http://purl.org/NET/scovo#"),
    ("sd", "http://www.w3.org/ns/sparql-service-description#"),
    ("sioc", "http://rdfs.org/sioc/ns#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("template", "http://dbpedia.org/resource/Template:"),
    ("template_fr", "http://fr.dbpedia.org/resource/Template:"),
    ("umbel_ac", "http://umbel.org/umbel/ac/"),
    ("umbel_sc", "http://umbel.org/umbel/sc/"),
    ("units", "http://dbpedia.org/units/"),
    ("vcard", "http://www.w3.org/2001/vcard-rdf/3.0#"),
    ("vcard2006", "http://www.w3.org/2006/vcard/ns#"),
    ("virtcxml", "http://www.openlinksw.com/schemas/virtcxml#"),
    ("virtrdf", "http://www.openlinksw.com/schemas/virtrdf#"),
    ("void", "http://rdfs.org/ns/void#"),
    ("wd", "http://www.wikidata.org/entity/"),
    ("wdata", "http://www.wikidata.org/wiki/Special:EntityData/"),
    ("wdno", "http://www.wikidata.org/prop/novalue/"),
    ("wdref", "http://www.wikidata.org/reference/"),
    ("wds", "http://www.wikidata.org/entity/statement/"),
    ("wdt", "http://www.wikidata.org/prop/direct/"),
    ("wdt_o", "http://www.wikidata.org/ontology#"),
    ("wdv", "http://www.wikidata.org/value/"),
    ("wiki_fr", "http://fr.wikipedia.org/wiki/"),
    ("wikibase", "http://wikiba.se/ontology#"),
    ("wikicompany", "http://dbpedia.openlinksw.com/wikicompany/"),
    ("wikidata", "http://www.wikidata.org/entity/"),
    ("xf", "http://www.w3.org/2004/07/xpath-functions"),
    ("xml", "http://www.w3.org/XML/1998/namespace"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("xsl10", "http://www.w3.org/XSL/Transform/1.0"),
    ("xsl1999", "http://www.w3.org/1999/XSL/Transform"),
    ("xslwd", "http://www.w3.org/TR/WD-xsl"),
    ("yago", "http://dbpedia.org/class/yago/"),
    ("yago_res", "http://mpii.de/yago/resource/"),
];
