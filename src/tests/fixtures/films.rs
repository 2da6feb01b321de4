use crate::{
    definition::{EnumDef, OperationDef, Resolver, SchemaDefinition, UnionDef},
    host::{HostType, HostTypeId, HostTypes, Member},
    schema::meta::EnumValue,
    shape::Shape,
};

/// Host types of the films domain.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Films {
    pub(crate) person: HostTypeId,
    pub(crate) director: HostTypeId,
    pub(crate) actor: HostTypeId,
    pub(crate) film: HostTypeId,
    pub(crate) genre: HostTypeId,
    pub(crate) search_result: HostTypeId,
    pub(crate) film_input: HostTypeId,
}

impl Films {
    /// Declares the films domain.
    ///
    /// `Film` and `Director` reference each other.
    pub(crate) fn declare(hosts: &mut HostTypes) -> Self {
        let person = hosts.declare(
            HostType::interface("demo.people.Person").property("name", Shape::raw(HostTypes::STRING)),
        );
        let director = hosts.declare(
            HostType::class("demo.people.Director")
                .implements(Shape::raw(person))
                .property("name", Shape::raw(HostTypes::STRING)),
        );
        let actor = hosts.declare(
            HostType::class("demo.people.Actor")
                .implements(Shape::raw(person))
                .property("name", Shape::raw(HostTypes::STRING))
                .property("role", Shape::raw(HostTypes::STRING).nullable()),
        );
        let genre = hosts.declare(HostType::enumeration("demo.Genre"));
        let film = hosts.declare(
            HostType::class("demo.Film")
                .property("title", Shape::raw(HostTypes::STRING))
                .property("year", Shape::raw(HostTypes::INT))
                .property("genre", Shape::raw(genre))
                .property("director", Shape::raw(director))
                .property("cast", Shape::list_of(Shape::raw(actor))),
        );
        hosts[director].push_member(Member::new("films", Shape::list_of(Shape::raw(film))));
        let search_result = hosts.declare(HostType::interface("demo.SearchResult"));
        let film_input = hosts.declare(
            HostType::class("demo.FilmInput")
                .property("title", Shape::raw(HostTypes::STRING))
                .property("year", Shape::raw(HostTypes::INT).nullable()),
        );

        Self {
            person,
            director,
            actor,
            film,
            genre,
            search_result,
            film_input,
        }
    }

    /// Schema of the films domain, with its queries and a single mutation.
    pub(crate) fn definition() -> (SchemaDefinition, Self) {
        let mut hosts = HostTypes::new();
        let films = Self::declare(&mut hosts);
        let definition = SchemaDefinition::new(hosts)
            .enumeration(EnumDef::new(
                films.genre,
                "Genre",
                vec![
                    EnumValue::new("DRAMA"),
                    EnumValue::new("COMEDY"),
                    EnumValue::new("WESTERN").deprecated(Some("Out of fashion".into())),
                ],
            ))
            .union(
                UnionDef::new("SearchResult", vec![films.film, films.director])
                    .claims(films.search_result),
            )
            .query(OperationDef::new(
                "films",
                Resolver::new("films").returns(Shape::list_of(Shape::raw(films.film))),
            ))
            .query(OperationDef::new(
                "film",
                Resolver::new("film")
                    .param("title", Shape::raw(HostTypes::STRING))
                    .param("rank", Shape::raw(HostTypes::INT).nullable())
                    .returns(Shape::raw(films.film).nullable()),
            ))
            .query(OperationDef::new(
                "director",
                Resolver::new("director")
                    .param("ctx", Shape::raw(HostTypes::CONTEXT))
                    .returns(Shape::raw(films.director)),
            ))
            .query(OperationDef::new(
                "search",
                Resolver::new("search").returns(Shape::list_of(Shape::raw(films.search_result))),
            ))
            .query(OperationDef::new(
                "credits",
                Resolver::new("credits").returns(Shape::list_of(Shape::raw(films.person))),
            ))
            .mutation(OperationDef::new(
                "addFilm",
                Resolver::new("add_film")
                    .param("input", Shape::raw(films.film_input))
                    .returns(Shape::raw(films.film)),
            ));
        (definition, films)
    }
}
